use crate::codec::{CodecRegistry, MissingReferencePolicy, PropertyLoader, ReferenceTable};
use crate::property::{PropertyBag, PropertyValue};
use crate::tree::{
    ComponentFactory, ComponentKind, ComponentNode, ListenerRegistrar, NodeListeners, TreeError,
    DEFAULT_MAX_PROPERTY_INDEX,
};
use crate::wire::{Element, COMPONENT, EVENT, PROPERTY};

/// How a property element addresses its target.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    /// `n`: set a field.
    Field(String),
    /// `m`: invoke an operation with the value.
    Method(String),
}

/// A decoded property element, not yet applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyUpdate {
    pub name: PropertyName,
    pub index: Option<usize>,
    pub value: PropertyValue,
}

impl PropertyUpdate {
    pub fn apply(self, target: PropertyTarget<'_>) -> Result<(), TreeError> {
        match target {
            PropertyTarget::Style(bag) => {
                let name = match &self.name {
                    PropertyName::Field(name) | PropertyName::Method(name) => name.as_str(),
                };
                match self.index {
                    Some(index) => bag.set_indexed(name, index, self.value),
                    None => bag.set(name, self.value),
                }
                Ok(())
            }
            PropertyTarget::Node { node, kind } => match (self.name, self.index) {
                (PropertyName::Method(method), _) => kind.invoke(node, &method, self.value),
                (PropertyName::Field(name), Some(index)) => {
                    kind.set_indexed_property(node, &name, index, self.value)
                }
                (PropertyName::Field(name), None) => kind.set_property(node, &name, self.value),
            },
        }
    }
}

/// Where decoded properties are written.
pub enum PropertyTarget<'t> {
    /// A live node, through its kind's setters.
    Node {
        node: &'t mut ComponentNode,
        kind: &'t dyn ComponentKind,
    },
    /// A style record's bag, written directly.
    Style(&'t mut PropertyBag),
}

/// Decodes component elements into nodes.
pub struct TreeDecoder<'a> {
    factory: &'a dyn ComponentFactory,
    listeners: &'a dyn ListenerRegistrar,
    loader: PropertyLoader<'a>,
    max_index: usize,
}

impl<'a> TreeDecoder<'a> {
    pub fn new(factory: &'a dyn ComponentFactory, registry: &'a CodecRegistry) -> Self {
        Self {
            factory,
            listeners: &NodeListeners,
            loader: PropertyLoader::new(registry),
            max_index: DEFAULT_MAX_PROPERTY_INDEX,
        }
    }

    /// Reject property elements whose `x` exceeds `max_index`.
    pub fn with_max_property_index(mut self, max_index: usize) -> Self {
        self.max_index = max_index;
        self
    }

    pub fn with_listeners(mut self, listeners: &'a dyn ListenerRegistrar) -> Self {
        self.listeners = listeners;
        self
    }

    pub fn with_references(mut self, references: &'a ReferenceTable) -> Self {
        self.loader = self.loader.with_references(references);
        self
    }

    pub fn with_missing_reference_policy(mut self, policy: MissingReferencePolicy) -> Self {
        self.loader = self.loader.with_missing_reference_policy(policy);
        self
    }

    pub fn loader(&self) -> &PropertyLoader<'a> {
        &self.loader
    }

    pub fn decode_component(&self, element: &Element) -> Result<ComponentNode, TreeError> {
        if element.name() != COMPONENT {
            return Err(TreeError::UnexpectedElement {
                expected: COMPONENT,
                found: element.name().to_string(),
            });
        }
        let type_tag = required(element, "t")?;
        let id = required(element, "i")?;
        let kind = self
            .factory
            .kind(type_tag)
            .ok_or_else(|| TreeError::UnknownComponentType(type_tag.to_string()))?;

        let mut node = kind.create(id);
        if element.attr("en") == Some("false") {
            node.enabled = false;
        }
        if let Some(style) = element.attr("s") {
            node.style_name = Some(style.to_string());
        }

        for child in element.children() {
            match child.name() {
                COMPONENT => node.children.push(self.decode_component(child)?),
                PROPERTY => {
                    let update = self.decode_property(child)?;
                    update.apply(PropertyTarget::Node {
                        node: &mut node,
                        kind: kind.as_ref(),
                    })?;
                }
                EVENT => {
                    let event = required(child, "t")?;
                    self.listeners.register(&mut node, event);
                }
                other => {
                    tracing::trace!(element = %other, component = %node.id, "Skipping unknown child element");
                }
            }
        }

        Ok(node)
    }

    /// Decode one property element. Exactly one of `n` and `m` must be set.
    pub fn decode_property(&self, element: &Element) -> Result<PropertyUpdate, TreeError> {
        let name = match (element.attr("n"), element.attr("m")) {
            (Some(name), None) => PropertyName::Field(name.to_string()),
            (None, Some(method)) => PropertyName::Method(method.to_string()),
            (Some(_), Some(_)) => return Err(TreeError::NameAndMethod),
            (None, None) => return Err(TreeError::MissingPropertyName),
        };
        let index = element
            .attr("x")
            .map(|text| match text.trim().parse::<usize>() {
                Ok(index) if index <= self.max_index => Ok(index),
                _ => Err(TreeError::InvalidIndex(text.to_string())),
            })
            .transpose()?;
        let value = self.loader.decode_value(element)?;
        Ok(PropertyUpdate { name, index, value })
    }

    /// Decode every property child of `element` into `bag`.
    pub fn decode_properties_into(
        &self,
        element: &Element,
        bag: &mut PropertyBag,
    ) -> Result<(), TreeError> {
        for property in element.children_named(PROPERTY) {
            self.decode_property(property)?
                .apply(PropertyTarget::Style(&mut *bag))?;
        }
        Ok(())
    }
}

pub(crate) fn required<'e>(element: &'e Element, attribute: &'static str) -> Result<&'e str, TreeError> {
    element
        .attr(attribute)
        .ok_or_else(|| TreeError::MissingAttribute {
            element: element.name().to_string(),
            attribute,
        })
}
