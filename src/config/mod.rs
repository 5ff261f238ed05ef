//! Configuration: TOML file, serde defaults, shared store.

mod loader;
mod store;
mod types;

pub use loader::ConfigError;
pub use store::ConfigStore;
pub use types::{CodecConfig, Config, LoggingConfig, SessionConfig};
