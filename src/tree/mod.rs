//! Component tree ⇄ wire document.
//!
//! ```text
//! <c t="Window" i="w1" s="Main">
//!   <p n="title">Inbox</p>          property (n | m, t, x, r)
//!   <e t="close"/>                  observed event kind
//!   <c t="Label" i="l1" en="false"/>
//! </c>
//! ```

mod decode;
mod encode;
mod factory;
mod node;

pub use decode::{PropertyName, PropertyTarget, PropertyUpdate, TreeDecoder};
pub use encode::TreeEncoder;
pub use factory::{
    BasicKind, ComponentFactory, ComponentKind, ComponentRegistry, ListenerRegistrar,
    NodeListeners,
};
pub use node::ComponentNode;

pub(crate) use decode::required;

use thiserror::Error;

use crate::codec::{CodecError, CodecRegistry, ReferenceTable};
use crate::wire::{Element, WireError};

/// Highest `x` index a decoder accepts unless configured otherwise.
pub const DEFAULT_MAX_PROPERTY_INDEX: usize = 4096;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Expected a '{expected}' element, found '{found}'")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },

    #[error("Unknown component type '{0}'")]
    UnknownComponentType(String),

    #[error("Element '{element}' is missing attribute '{attribute}'")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("Property element carries both a name and a method")]
    NameAndMethod,

    #[error("Property element carries neither a name nor a method")]
    MissingPropertyName,

    #[error("Invalid property index '{0}'")]
    InvalidIndex(String),

    #[error("Component '{kind}' has no method '{method}'")]
    UnknownMethod { kind: String, method: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Encode a whole tree.
pub fn encode(root: &ComponentNode, registry: &CodecRegistry) -> Result<Element, TreeError> {
    TreeEncoder::new(registry).encode_component(root)
}

/// Decode a whole tree, resolving `r` keys against `references` when given.
pub fn decode(
    document: &Element,
    factory: &dyn ComponentFactory,
    registry: &CodecRegistry,
    references: Option<&ReferenceTable>,
) -> Result<ComponentNode, TreeError> {
    let decoder = TreeDecoder::new(factory, registry);
    match references {
        Some(references) => decoder.with_references(references).decode_component(document),
        None => decoder.decode_component(document),
    }
}
