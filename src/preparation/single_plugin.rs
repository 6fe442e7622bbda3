//! Make the plugin under test the only active plugin.

use super::{Cleanup, Preparation};
use crate::error::{PluginCheckError, Result};
use crate::host::Environment;

/// Replaces the active plugin list with just the target.
///
/// The cleanup restores the exact original list, order included.
#[derive(Debug, Clone)]
pub struct ForceSinglePluginPreparation {
    basename: String,
}

impl ForceSinglePluginPreparation {
    pub fn new(basename: impl Into<String>) -> Self {
        Self {
            basename: basename.into(),
        }
    }
}

impl Preparation for ForceSinglePluginPreparation {
    fn name(&self) -> &str {
        "force-single-plugin"
    }

    fn prepare(&self, env: &mut Environment) -> Result<Cleanup> {
        if !env.is_plugin_active(&self.basename) {
            return Err(PluginCheckError::preparation(
                self.name(),
                format!("plugin '{}' is not active", self.basename),
            ));
        }

        let snapshot = std::mem::replace(&mut env.active_plugins, vec![self.basename.clone()]);
        Ok(Cleanup::new(self.name(), move |env| {
            env.active_plugins = snapshot;
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment {
            active_plugins: vec!["a/a.php".into(), "target/target.php".into(), "b/b.php".into()],
            ..Default::default()
        }
    }

    #[test]
    fn restores_exact_list_and_order() {
        let mut env = env();
        let mut cleanup = ForceSinglePluginPreparation::new("target/target.php")
            .prepare(&mut env)
            .unwrap();
        assert_eq!(env.active_plugins, vec!["target/target.php"]);

        cleanup.run(&mut env);
        assert_eq!(
            env.active_plugins,
            vec!["a/a.php", "target/target.php", "b/b.php"]
        );
    }

    #[test]
    fn cleanup_twice_leaves_list_unchanged() {
        let mut env = env();
        let mut cleanup = ForceSinglePluginPreparation::new("target/target.php")
            .prepare(&mut env)
            .unwrap();

        cleanup.run(&mut env);
        let after_first = env.clone();
        env.active_plugins.push("c/c.php".into());
        cleanup.run(&mut env);

        assert_eq!(env.active_plugins.len(), after_first.active_plugins.len() + 1);
        assert!(env.active_plugins.starts_with(&after_first.active_plugins));
    }

    #[test]
    fn inactive_plugin_is_rejected_without_mutation() {
        let mut env = env();
        let before = env.clone();
        let err = ForceSinglePluginPreparation::new("missing/missing.php")
            .prepare(&mut env)
            .unwrap_err();

        assert!(matches!(err, PluginCheckError::Preparation { .. }));
        assert_eq!(env, before);
    }
}
