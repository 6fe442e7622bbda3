//! The host's shared, mutable state.
//!
//! [`Environment`] is the single global resource preparations stage and
//! restore: the active plugin list, the active theme, request
//! classification flags and the content store.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the host's shared state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Environment {
    /// Active plugin basenames, in activation order.
    #[serde(default)]
    pub active_plugins: Vec<String>,

    /// Active presentation layer.
    #[serde(default)]
    pub theme: ThemeState,

    /// Request classification signals.
    #[serde(default)]
    pub flags: RequestFlags,

    /// Content records.
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// Active theme identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemeState {
    pub template: String,
    pub stylesheet: String,
    /// Directory themes are loaded from; `None` means the host default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_root: Option<PathBuf>,
}

/// Signals that route a request down admin or async code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestFlags {
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub doing_ajax: bool,
}

/// Publication status of a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Publish,
    Draft,
    Private,
}

/// A stored content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields for a record about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub status: ContentStatus,
}

impl NewContent {
    /// A record with no title, body or excerpt has nothing to render.
    pub fn is_degenerate(&self) -> bool {
        self.title.trim().is_empty() && self.body.trim().is_empty() && self.excerpt.trim().is_empty()
    }
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `basename` is in the active plugin list.
    pub fn is_plugin_active(&self, basename: &str) -> bool {
        self.active_plugins.iter().any(|p| p == basename)
    }

    /// Insert a content record and return its ID.
    ///
    /// IDs continue from the highest stored ID, so removing freshly inserted
    /// records leaves no trace behind.
    pub fn insert_content(&mut self, content: NewContent) -> u64 {
        let id = self.content.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        self.content.push(ContentItem {
            id,
            title: content.title,
            body: content.body,
            excerpt: content.excerpt,
            status: content.status,
            created_at: Utc::now(),
        });
        id
    }

    /// Remove a content record. Returns whether it existed.
    pub fn remove_content(&mut self, id: u64) -> bool {
        let before = self.content.len();
        self.content.retain(|item| item.id != id);
        self.content.len() != before
    }

    pub fn content(&self) -> &[ContentItem] {
        &self.content
    }

    pub fn find_content(&self, id: u64) -> Option<&ContentItem> {
        self.content.iter().find(|item| item.id == id)
    }
}
