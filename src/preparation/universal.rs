//! The staging every runtime check runs under.

use super::{
    stage_all, Cleanup, DemoContentPreparation, ForceSinglePluginPreparation, MinimalTheme,
    MinimalThemePreparation, NeutralRequestFlagsPreparation, Preparation,
};
use crate::error::Result;
use crate::host::{Environment, NewContent};

/// Composes the single-plugin, minimal-theme, demo-content and
/// request-flag preparations, in that order.
///
/// A failure part-way unwinds the steps already staged by the same call.
#[derive(Debug, Clone)]
pub struct UniversalRuntimePreparation {
    single_plugin: ForceSinglePluginPreparation,
    theme: MinimalThemePreparation,
    demo_content: DemoContentPreparation,
    flags: NeutralRequestFlagsPreparation,
}

impl UniversalRuntimePreparation {
    pub fn new(plugin_basename: &str, theme: MinimalTheme, demo_content: Vec<NewContent>) -> Self {
        Self {
            single_plugin: ForceSinglePluginPreparation::new(plugin_basename),
            theme: MinimalThemePreparation::new(theme),
            demo_content: DemoContentPreparation::new(demo_content),
            flags: NeutralRequestFlagsPreparation,
        }
    }

    fn steps(&self) -> [&dyn Preparation; 4] {
        [
            &self.single_plugin,
            &self.theme,
            &self.demo_content,
            &self.flags,
        ]
    }
}

impl Preparation for UniversalRuntimePreparation {
    fn name(&self) -> &str {
        "universal-runtime"
    }

    fn prepare(&self, env: &mut Environment) -> Result<Cleanup> {
        let stack = stage_all(self.steps(), env)?;
        Ok(stack.into_cleanup(self.name()))
    }
}
