//! Registry of available checks.
//!
//! The [`ChecksRegistry`] holds every check a run may select, keyed by slug,
//! together with the [`CategoryRegistry`] their categories are drawn from.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::builtin::{FileTypeCheck, PluginReadmeCheck};
use super::category::{matches_categories, CategoryId, CategoryRegistry};
use super::check::Check;
use crate::error::{PluginCheckError, Result};

/// Contributes categories and checks to the registries.
pub trait CheckProvider {
    /// Categories to add or relabel.
    fn categories(&self) -> Vec<(CategoryId, String)> {
        Vec::new()
    }

    /// Checks to register.
    fn checks(&self) -> Vec<Check>;
}

/// Registry of all available checks.
pub struct ChecksRegistry {
    checks: BTreeMap<String, Check>,
    categories: CategoryRegistry,
}

impl ChecksRegistry {
    /// Create an empty registry with the default categories.
    pub fn new() -> Self {
        Self {
            checks: BTreeMap::new(),
            categories: CategoryRegistry::with_defaults(),
        }
    }

    /// Create a registry with the built-in checks.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for check in builtin_checks() {
            registry.insert(check);
        }
        registry
    }

    /// Register a check. A later check with the same slug replaces the
    /// earlier one.
    pub fn register(&mut self, check: Check) -> Result<()> {
        let slug = check.slug().to_string();
        let categories = check.info().categories();
        if categories.is_empty() {
            return Err(PluginCheckError::CheckWithoutCategories { slug });
        }
        for category in categories.iter().filter(|c| !self.categories.contains(c)) {
            debug!("Check '{}' uses unlisted category '{}'", slug, category);
        }
        self.insert(check);
        Ok(())
    }

    fn insert(&mut self, check: Check) {
        let slug = check.slug().to_string();
        if self.checks.insert(slug.clone(), check).is_some() {
            debug!("Check '{}' replaced by a later registration", slug);
        }
    }

    /// Merge a provider's categories and checks.
    pub fn extend(&mut self, provider: &dyn CheckProvider) -> Result<()> {
        self.categories.merge(provider.categories());
        for check in provider.checks() {
            self.register(check)?;
        }
        Ok(())
    }

    /// Get a check by slug.
    pub fn get(&self, slug: &str) -> Option<&Check> {
        self.checks.get(slug)
    }

    /// Iterate over all checks, ordered by slug.
    pub fn iter(&self) -> impl Iterator<Item = &Check> {
        self.checks.values()
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Resolve explicitly requested checks, in request order.
    ///
    /// Unknown slugs are rejected, and so are runtime checks when the plugin
    /// is not active. A slug named twice resolves once, at its first
    /// position.
    pub fn resolve<S: AsRef<str>>(
        &self,
        slugs: &[S],
        plugin_active: bool,
        plugin: &str,
    ) -> Result<Vec<&Check>> {
        let mut seen = BTreeSet::new();
        let mut resolved = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let slug = slug.as_ref();
            if !seen.insert(slug) {
                continue;
            }
            let check = self
                .get(slug)
                .ok_or_else(|| PluginCheckError::UnknownCheck {
                    slug: slug.to_string(),
                })?;
            if check.is_runtime() && !plugin_active {
                return Err(PluginCheckError::RuntimeCheckInactivePlugin {
                    slug: slug.to_string(),
                    plugin: plugin.to_string(),
                });
            }
            resolved.push(check);
        }
        Ok(resolved)
    }

    /// Resolve the checks a run uses when none are named.
    ///
    /// Experimental checks are skipped unless included; runtime checks are
    /// skipped when the plugin is not active. An empty category set selects
    /// every category.
    pub fn resolve_default(
        &self,
        plugin_active: bool,
        categories: &BTreeSet<CategoryId>,
        include_experimental: bool,
    ) -> Vec<&Check> {
        self.iter()
            .filter(|check| include_experimental || !check.info().is_experimental())
            .filter(|check| plugin_active || !check.is_runtime())
            .filter(|check| matches_categories(&check.info().categories(), categories))
            .collect()
    }
}

/// The checks every registry starts with. Each declares at least one
/// category.
fn builtin_checks() -> [Check; 2] {
    [
        Check::Static(Box::new(FileTypeCheck)),
        Check::Static(Box::new(PluginReadmeCheck)),
    ]
}

impl Default for ChecksRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::checks::check::{CheckInfo, RuntimeCheck, Stability, StaticCheck};
    use crate::host::Environment;
    use crate::result::CheckResult;

    /// Configurable check for registry and runner tests.
    pub struct Stub {
        pub slug: String,
        pub categories: Vec<CategoryId>,
        pub stability: Stability,
    }

    impl Stub {
        pub fn new(slug: &str, categories: &[&str]) -> Self {
            Self {
                slug: slug.to_string(),
                categories: categories.iter().map(|c| CategoryId::new(*c)).collect(),
                stability: Stability::Stable,
            }
        }

        pub fn experimental(mut self) -> Self {
            self.stability = Stability::Experimental;
            self
        }

        pub fn into_static(self) -> Check {
            Check::Static(Box::new(self))
        }

        pub fn into_runtime(self) -> Check {
            Check::Runtime(Box::new(self))
        }
    }

    impl CheckInfo for Stub {
        fn slug(&self) -> &str {
            &self.slug
        }

        fn categories(&self) -> Vec<CategoryId> {
            self.categories.clone()
        }

        fn stability(&self) -> Stability {
            self.stability
        }

        fn description(&self) -> &str {
            "stub"
        }
    }

    impl StaticCheck for Stub {
        fn run(&self, _result: &mut CheckResult) -> anyhow::Result<()> {
            Ok(())
        }
    }

    impl RuntimeCheck for Stub {
        fn run(&self, _result: &mut CheckResult, _env: &Environment) -> anyhow::Result<()> {
            Ok(())
        }
    }
}
