//! The host application's state as seen by the engine.
//!
//! - [`environment`] - The shared state preparations stage and restore
//! - [`store`] - JSON persistence of that state
//! - [`discovery`] - Installed plugins and target resolution

pub mod discovery;
pub mod environment;
pub mod store;

pub use discovery::{InstalledPlugin, PluginDirectory, PLUGIN_HEADER};
pub use environment::{
    ContentItem, ContentStatus, Environment, NewContent, RequestFlags, ThemeState,
};
pub use store::{HostStore, STATE_DIR};
