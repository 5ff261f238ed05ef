//! Server-held UI component tree synchronization.
//!
//! - [`wire`]: XML element tree used on the wire
//! - [`property`] / [`codec`]: typed property values and their codecs
//! - [`tree`] / [`style`]: component trees and style sheets ⇄ wire elements
//! - [`session`]: per-session state (render state, transaction counter, ...)
//! - [`gate`]: transaction consistency check for client batches

pub mod codec;
pub mod config;
pub mod gate;
pub mod logging;
pub mod property;
pub mod session;
pub mod style;
pub mod tree;
pub mod wire;
