//! Component kinds and the factory that instantiates them by type tag.

use std::collections::HashMap;
use std::sync::Arc;

use crate::property::PropertyValue;
use crate::tree::{ComponentNode, TreeError};

/// Behaviour of one concrete component type.
///
/// The defaults store values straight into the node's property bag and
/// reject every method-style invocation.
pub trait ComponentKind: Send + Sync {
    fn type_name(&self) -> &str;

    fn create(&self, id: &str) -> ComponentNode {
        ComponentNode::new(self.type_name(), id)
    }

    fn set_property(
        &self,
        node: &mut ComponentNode,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), TreeError> {
        node.properties.set(name, value);
        Ok(())
    }

    /// Indexed writes grow the backing sequence; sparse indices never fail.
    fn set_indexed_property(
        &self,
        node: &mut ComponentNode,
        name: &str,
        index: usize,
        value: PropertyValue,
    ) -> Result<(), TreeError> {
        node.properties.set_indexed(name, index, value);
        Ok(())
    }

    /// Method-style property (`m` attribute): run an operation with the value.
    fn invoke(
        &self,
        node: &mut ComponentNode,
        method: &str,
        _value: PropertyValue,
    ) -> Result<(), TreeError> {
        Err(TreeError::UnknownMethod {
            kind: node.kind.clone(),
            method: method.to_string(),
        })
    }

    /// Whether client input may modify this node right now.
    fn accepts_input(&self, node: &ComponentNode) -> bool {
        node.enabled
    }
}

/// Type tag → component kind.
pub trait ComponentFactory {
    fn kind(&self, type_tag: &str) -> Option<Arc<dyn ComponentKind>>;
}

/// Receives observed event kinds found while decoding.
pub trait ListenerRegistrar {
    fn register(&self, node: &mut ComponentNode, event: &str);
}

/// Records event kinds on the node itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeListeners;

impl ListenerRegistrar for NodeListeners {
    fn register(&self, node: &mut ComponentNode, event: &str) {
        node.events.insert(event.to_string());
    }
}

/// A kind with only the default behaviour.
#[derive(Debug, Clone)]
pub struct BasicKind {
    type_name: String,
}

impl BasicKind {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

impl ComponentKind for BasicKind {
    fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Registered component kinds.
#[derive(Default)]
pub struct ComponentRegistry {
    kinds: HashMap<String, Arc<dyn ComponentKind>>,
    accept_unknown: bool,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every unregistered type tag as a [`BasicKind`] instead of
    /// failing the decode.
    pub fn accept_unknown_types(mut self, accept: bool) -> Self {
        self.accept_unknown = accept;
        self
    }

    pub fn register(&mut self, kind: Arc<dyn ComponentKind>) {
        self.kinds.insert(kind.type_name().to_string(), kind);
    }

    pub fn register_basic(&mut self, type_name: &str) {
        self.register(Arc::new(BasicKind::new(type_name)));
    }

    pub fn with_basic(mut self, type_names: &[&str]) -> Self {
        for name in type_names {
            self.register_basic(name);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl ComponentFactory for ComponentRegistry {
    fn kind(&self, type_tag: &str) -> Option<Arc<dyn ComponentKind>> {
        match self.kinds.get(type_tag) {
            Some(kind) => Some(Arc::clone(kind)),
            None if self.accept_unknown => Some(Arc::new(BasicKind::new(type_tag))),
            None => None,
        }
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.kinds.keys().collect();
        kinds.sort();
        f.debug_struct("ComponentRegistry")
            .field("kinds", &kinds)
            .field("accept_unknown", &self.accept_unknown)
            .finish()
    }
}
