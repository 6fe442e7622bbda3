//! Check categories.
//!
//! Categories group checks for selection. The registry is seeded with a
//! default set and open to additions from external providers.

use std::collections::{BTreeMap, BTreeSet};

/// Identifier of a check category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub const GENERAL: &'static str = "general";
    pub const PLUGIN_REPO: &'static str = "plugin_repo";
    pub const SECURITY: &'static str = "security";
    pub const PERFORMANCE: &'static str = "performance";
    pub const ACCESSIBILITY: &'static str = "accessibility";

    /// Create a new category ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Known categories and their display labels.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    labels: BTreeMap<CategoryId, String>,
}

impl CategoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            labels: BTreeMap::new(),
        }
    }

    /// Create a registry with the default categories.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.merge([
            (CategoryId::new(CategoryId::GENERAL), "General"),
            (CategoryId::new(CategoryId::PLUGIN_REPO), "Plugin Repo"),
            (CategoryId::new(CategoryId::SECURITY), "Security"),
            (CategoryId::new(CategoryId::PERFORMANCE), "Performance"),
            (CategoryId::new(CategoryId::ACCESSIBILITY), "Accessibility"),
        ]);
        registry
    }

    /// Add categories. An existing ID takes the label merged last.
    pub fn merge<I, L>(&mut self, categories: I)
    where
        I: IntoIterator<Item = (CategoryId, L)>,
        L: Into<String>,
    {
        for (id, label) in categories {
            self.labels.insert(id, label.into());
        }
    }

    /// Display label for a category.
    pub fn label(&self, id: &CategoryId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.labels.contains_key(id)
    }

    /// Iterate over `(id, label)` pairs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&CategoryId, &str)> {
        self.labels.iter().map(|(id, label)| (id, label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Whether a check's categories intersect the requested set.
///
/// An empty request selects everything.
pub fn matches_categories(check: &[CategoryId], requested: &BTreeSet<CategoryId>) -> bool {
    requested.is_empty() || check.iter().any(|c| requested.contains(c))
}
