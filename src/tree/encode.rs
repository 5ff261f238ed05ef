use crate::codec::{CodecRegistry, PropertyWriter, ReferenceTable};
use crate::property::{PropertyBag, PropertyEntry};
use crate::tree::{ComponentNode, TreeError};
use crate::wire::{Element, COMPONENT, EVENT};

/// Encodes nodes into component elements.
///
/// Output order per node: properties (by name), observed events, children.
#[derive(Clone, Copy)]
pub struct TreeEncoder<'a> {
    writer: PropertyWriter<'a>,
}

impl<'a> TreeEncoder<'a> {
    pub fn new(registry: &'a CodecRegistry) -> Self {
        Self {
            writer: PropertyWriter::new(registry),
        }
    }

    pub fn with_references(mut self, references: &'a ReferenceTable) -> Self {
        self.writer = self.writer.with_references(references);
        self
    }

    pub fn encode_component(&self, node: &ComponentNode) -> Result<Element, TreeError> {
        let mut element = Element::new(COMPONENT)
            .with_attr("t", node.kind.as_str())
            .with_attr("i", node.id.as_str());
        if !node.enabled {
            element.set_attr("en", "false");
        }
        if let Some(style) = &node.style_name {
            element.set_attr("s", style.as_str());
        }

        self.encode_properties(&node.properties, &mut element)?;
        for event in &node.events {
            element.push_child(Element::new(EVENT).with_attr("t", event.as_str()));
        }
        for child in &node.children {
            element.push_child(self.encode_component(child)?);
        }
        Ok(element)
    }

    /// Append one property element per encodable value of `bag`.
    pub fn encode_properties(&self, bag: &PropertyBag, parent: &mut Element) -> Result<(), TreeError> {
        for (name, entry) in bag.iter() {
            match entry {
                PropertyEntry::Value(value) => {
                    if let Some(property) = self.writer.write_property(name, None, value)? {
                        parent.push_child(property);
                    }
                }
                PropertyEntry::Indexed(values) => {
                    for (index, value) in values.iter().enumerate() {
                        if let Some(property) = self.writer.write_property(name, Some(index), value)? {
                            parent.push_child(property);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
