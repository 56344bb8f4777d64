//! Editor session configuration.

use crate::shapes::LineCap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Configuration has no author")]
    MissingAuthor,
}

/// What undoing a `change` entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndoChangePolicy {
    /// The pointer moves, the geometry stays and nothing is broadcast.
    #[default]
    Ignore,
    /// The previous geometry is restored and broadcast as a `change`;
    /// redo re-applies the newer geometry.
    Restore,
}

/// Settings for one editing client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Local identity; prefixes shape ids and tags outbound messages.
    pub author: String,
    /// Channel shared by all clients of one drawing.
    pub channel: String,
    /// Stroke color for new shapes.
    pub stroke: String,
    /// Fill color for new closed shapes.
    pub fill: String,
    pub stroke_width: f64,
    pub linecap: LineCap,
    /// Placeholder content of new text shapes.
    pub text: String,
    pub undo_change: UndoChangePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            author: String::new(),
            channel: "img_0".to_string(),
            stroke: "#000000".to_string(),
            fill: "#ffffff".to_string(),
            stroke_width: 5.0,
            linecap: LineCap::Round,
            text: "Text".to_string(),
            undo_change: UndoChangePolicy::Ignore,
        }
    }
}

impl SessionConfig {
    /// Default settings for `author`.
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            ..Self::default()
        }
    }

    /// Load settings from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.author.trim().is_empty() {
            return Err(ConfigError::MissingAuthor);
        }
        Ok(config)
    }
}
