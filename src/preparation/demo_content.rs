//! Seed deterministic demo content.

use tracing::debug;

use super::shared::SharedPreparation;
use super::{Cleanup, Preparation};
use crate::error::{PluginCheckError, Result};
use crate::host::{ContentStatus, Environment, NewContent};

/// Inserts content fixtures so rendering checks have something to render.
///
/// The cleanup removes exactly the records this preparation created;
/// content that existed before is never touched.
#[derive(Debug, Clone)]
pub struct DemoContentPreparation {
    fixtures: Vec<NewContent>,
}

impl DemoContentPreparation {
    pub const KIND: &'static str = "demo-content";

    pub fn new(fixtures: Vec<NewContent>) -> Self {
        Self { fixtures }
    }

    /// The single post seeded when nothing else is configured.
    pub fn default_fixtures() -> Vec<NewContent> {
        vec![NewContent {
            title: "Plugin Check demo".to_string(),
            body: "This is a demo post created to render plugin output against.".to_string(),
            excerpt: String::new(),
            status: ContentStatus::Publish,
        }]
    }

    /// Request these fixtures as a shared preparation.
    ///
    /// Checks asking for identical fixtures share one staged copy.
    pub fn shared(fixtures: Vec<NewContent>) -> Result<SharedPreparation> {
        let args = serde_json::to_value(&fixtures)
            .map_err(|e| PluginCheckError::preparation(Self::KIND, e.to_string()))?;
        Ok(SharedPreparation::new(Self::KIND, args, build_from_args))
    }
}

fn build_from_args(args: &serde_json::Value) -> Result<Box<dyn Preparation>> {
    let fixtures: Vec<NewContent> = serde_json::from_value(args.clone()).map_err(|e| {
        PluginCheckError::preparation(DemoContentPreparation::KIND, e.to_string())
    })?;
    Ok(Box::new(DemoContentPreparation::new(fixtures)))
}

impl Preparation for DemoContentPreparation {
    fn name(&self) -> &str {
        Self::KIND
    }

    fn prepare(&self, env: &mut Environment) -> Result<Cleanup> {
        if let Some(index) = self.fixtures.iter().position(NewContent::is_degenerate) {
            return Err(PluginCheckError::preparation(
                self.name(),
                format!(
                    "demo content #{} has an empty title, body and excerpt",
                    index + 1
                ),
            ));
        }

        let created: Vec<u64> = self
            .fixtures
            .iter()
            .map(|fixture| env.insert_content(fixture.clone()))
            .collect();

        debug!("Seeded {} demo content record(s)", created.len());
        Ok(Cleanup::new(self.name(), move |env| {
            for id in created {
                env.remove_content(id);
            }
        }))
    }
}
