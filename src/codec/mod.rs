//! Property codecs.
//!
//! A [`PropertyCodec`] translates one kind of property value to and from a
//! property element. Codecs live in a [`CodecRegistry`] and are resolved by
//! explicit type tag when decoding, and by declared class tag then runtime
//! type key when encoding.
//!
//! ```text
//! <p n="font" t="Font"><f sz="10pt" bo="1"><tf>Arial</tf></f></p>
//!          │      │      └── codec-specific body
//!          │      └── type tag → registry.resolve("Font")
//!          └── property name
//! ```

mod builtin;
mod loader;
mod registry;

pub use builtin::{register_builtins, ObjectCodec};
pub use loader::{PropertyLoader, PropertyWriter};
pub use registry::CodecRegistry;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::property::{ParseValueError, PropertyValue};
use crate::wire::{Element, WireError};

/// Scalar type tags.
pub mod tags {
    pub const BOOLEAN: &str = "b";
    pub const INTEGER: &str = "i";
    pub const NUMBER: &str = "n";
    pub const STRING: &str = "s";
}

/// Errors raised by property decoding and encoding.
///
/// Every variant is fatal for the surrounding decode pass. Soft-skip
/// conditions (no encoder for a value, unparseable date text) never surface
/// as errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unknown property type '{0}'")]
    UnknownPropertyType(String),

    #[error("Element '{element}' is missing attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("Element '{element}' is missing child element '{child}'")]
    MissingElement {
        element: String,
        child: &'static str,
    },

    #[error("Invalid '{tag}' value: {source}")]
    InvalidValue {
        tag: String,
        #[source]
        source: ParseValueError,
    },

    #[error("Border is missing its top side")]
    BorderWithoutTop,

    #[error("Fill image border needs 0 or 8 images, found {0}")]
    FillImageBorderCount(usize),

    #[error("Unresolved reference '{0}'")]
    UnresolvedReference(String),

    #[error("Codec '{tag}' cannot encode a {found} value")]
    UnexpectedValue { tag: String, found: String },

    #[error("Failed to encode '{tag}' value: {message}")]
    Encode { tag: String, message: String },

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Bidirectional translator between one kind of property value and its
/// wire form inside a property element.
pub trait PropertyCodec: Send + Sync {
    /// Tag written to the property element's `t` attribute on encode.
    fn type_tag(&self) -> &str;

    /// Decode the value carried by `property` (text or nested elements).
    fn decode(
        &self,
        loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError>;

    /// Write `value` into `property` as text or nested elements.
    fn encode(
        &self,
        writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError>;
}

/// What a decode pass does with a reference key missing from the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReferencePolicy {
    /// Leave the property unresolved as `Null`.
    #[default]
    Null,
    /// Abort the decode with [`CodecError::UnresolvedReference`].
    Fail,
}

/// Key → previously materialized value, consulted for property elements that
/// carry an `r` attribute and no explicit type tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    entries: BTreeMap<String, PropertyValue>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    /// First key (in key order) whose value equals `value`.
    pub fn key_of(&self, value: &PropertyValue) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
