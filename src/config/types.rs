use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::MissingReferencePolicy;
use crate::tree::DEFAULT_MAX_PROPERTY_INDEX;
use crate::wire::DEFAULT_MAX_DEPTH;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied to every new session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Poll interval when no task queue has voted (default: 500).
    #[serde(default = "default_poll_interval_ms")]
    pub default_poll_interval_ms: u64,
    /// Response character encoding (default: "UTF-8").
    #[serde(default = "default_character_encoding")]
    pub character_encoding: String,
    /// Base URI service URIs are built from (default: "/app").
    #[serde(default = "default_servlet_uri")]
    pub servlet_uri: String,
}

/// Decode behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// What to do with a reference key missing from the table.
    #[serde(default)]
    pub missing_reference: MissingReferencePolicy,
    /// Decode unregistered component types as plain nodes instead of failing.
    #[serde(default)]
    pub accept_unknown_components: bool,
    /// Deepest element nesting accepted in a document (default: 256).
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Highest `x` index accepted on a property element (default: 4096).
    #[serde(default = "default_max_property_index")]
    pub max_property_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `UISYNC_LOG` / `RUST_LOG` are unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_character_encoding() -> String {
    "UTF-8".to_string()
}

fn default_servlet_uri() -> String {
    "/app".to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_property_index() -> usize {
    DEFAULT_MAX_PROPERTY_INDEX
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_poll_interval_ms: default_poll_interval_ms(),
            character_encoding: default_character_encoding(),
            servlet_uri: default_servlet_uri(),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            missing_reference: MissingReferencePolicy::default(),
            accept_unknown_components: false,
            max_depth: default_max_depth(),
            max_property_index: default_max_property_index(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}
