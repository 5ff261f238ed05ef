//! Wire document model.
//!
//! Synchronization messages are small XML documents. This module provides an
//! owned element tree plus reading and writing through `quick-xml`. The
//! codec layers above only ever see [`Element`].

mod element;
mod reader;
mod writer;

pub use element::Element;

use thiserror::Error;

/// Component element tag.
pub const COMPONENT: &str = "c";
/// Property element tag.
pub const PROPERTY: &str = "p";
/// Event element tag.
pub const EVENT: &str = "e";
/// Style sheet element tag.
pub const STYLE_SHEET: &str = "ss";
/// Style element tag (child of a style sheet).
pub const STYLE: &str = "s";
/// Client-to-server message tag.
pub const CLIENT_MESSAGE: &str = "cmsg";
/// Server-to-client message tag.
pub const SERVER_MESSAGE: &str = "smsg";

/// Deepest element nesting [`Element::parse`] accepts.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Errors produced while reading or writing wire documents.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Document contains no element")]
    EmptyDocument,

    #[error("Document contains more than one root element")]
    MultipleRoots,

    #[error("Document nests elements deeper than {limit}")]
    TooDeep { limit: usize },

    #[error("Element '{name}' is not closed")]
    Unclosed { name: String },

    #[error("Failed to write document: {0}")]
    Write(String),

    #[error("Written document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
