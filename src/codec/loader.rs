use std::collections::BTreeMap;

use crate::codec::{tags, CodecError, CodecRegistry, MissingReferencePolicy, ReferenceTable};
use crate::property::PropertyValue;
use crate::wire::{Element, PROPERTY};

/// Decodes property elements into values.
///
/// Resolution order for one property element:
/// 1. explicit `t` → registered codec (unknown tag is fatal);
/// 2. no `t`, a reference table is present and the element has `r` → table
///    lookup, a missing key handled by [`MissingReferencePolicy`];
/// 3. otherwise the element text as a plain string.
#[derive(Clone, Copy)]
pub struct PropertyLoader<'a> {
    registry: &'a CodecRegistry,
    references: Option<&'a ReferenceTable>,
    missing_reference: MissingReferencePolicy,
}

impl<'a> PropertyLoader<'a> {
    pub fn new(registry: &'a CodecRegistry) -> Self {
        Self {
            registry,
            references: None,
            missing_reference: MissingReferencePolicy::default(),
        }
    }

    pub fn with_references(mut self, references: &'a ReferenceTable) -> Self {
        self.references = Some(references);
        self
    }

    pub fn with_missing_reference_policy(mut self, policy: MissingReferencePolicy) -> Self {
        self.missing_reference = policy;
        self
    }

    pub fn registry(&self) -> &'a CodecRegistry {
        self.registry
    }

    pub fn decode_value(&self, property: &Element) -> Result<PropertyValue, CodecError> {
        if let Some(tag) = property.attr("t") {
            let codec = self
                .registry
                .resolve(tag)
                .ok_or_else(|| CodecError::UnknownPropertyType(tag.to_string()))?;
            return codec.decode(self, property);
        }

        if let (Some(references), Some(key)) = (self.references, property.attr("r")) {
            return match references.get(key) {
                Some(value) => Ok(value.clone()),
                None => match self.missing_reference {
                    MissingReferencePolicy::Null => {
                        tracing::debug!(key = %key, "Reference not in table, leaving property null");
                        Ok(PropertyValue::Null)
                    }
                    MissingReferencePolicy::Fail => {
                        Err(CodecError::UnresolvedReference(key.to_string()))
                    }
                },
            };
        }

        Ok(PropertyValue::String(property.text().to_string()))
    }

    /// Decode every nested property element of `container` into a fresh map.
    /// Each entry must carry its own `n`.
    pub fn decode_named(
        &self,
        container: &Element,
    ) -> Result<BTreeMap<String, PropertyValue>, CodecError> {
        let mut map = BTreeMap::new();
        for property in container.children_named(PROPERTY) {
            let name = property
                .attr("n")
                .ok_or_else(|| CodecError::MissingAttribute {
                    element: PROPERTY.to_string(),
                    attribute: "n",
                })?;
            map.insert(name.to_string(), self.decode_value(property)?);
        }
        Ok(map)
    }
}

/// Encodes values into property elements.
///
/// Nulls are omitted. Scalars are written as their text form (non-string
/// scalars also carry their scalar tag). Other values go through the
/// registry by declared class tag, then runtime type key; a value no codec
/// accepts is skipped.
#[derive(Clone, Copy)]
pub struct PropertyWriter<'a> {
    registry: &'a CodecRegistry,
    references: Option<&'a ReferenceTable>,
}

impl<'a> PropertyWriter<'a> {
    pub fn new(registry: &'a CodecRegistry) -> Self {
        Self {
            registry,
            references: None,
        }
    }

    /// Values equal to an entry of `references` are written as `r="key"`.
    pub fn with_references(mut self, references: &'a ReferenceTable) -> Self {
        self.references = Some(references);
        self
    }

    /// Build a property element, or `None` when the value is skipped.
    pub fn write_property(
        &self,
        name: &str,
        index: Option<usize>,
        value: &PropertyValue,
    ) -> Result<Option<Element>, CodecError> {
        let mut property = Element::new(PROPERTY).with_attr("n", name);
        if let Some(index) = index {
            property.set_attr("x", index.to_string());
        }

        if !value.is_null() && !value.is_scalar() {
            if let Some(key) = self.references.and_then(|r| r.key_of(value)) {
                property.set_attr("r", key);
                return Ok(Some(property));
            }
        }

        if self.write_value(value, &mut property)? {
            Ok(Some(property))
        } else {
            Ok(None)
        }
    }

    /// Write `value` into an existing property element. Returns `false` if
    /// the value was skipped.
    pub fn write_value(
        &self,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<bool, CodecError> {
        let scalar_tag = match value {
            PropertyValue::Null => return Ok(false),
            PropertyValue::String(text) => {
                property.set_text(text.as_str());
                return Ok(true);
            }
            PropertyValue::Boolean(_) => Some(tags::BOOLEAN),
            PropertyValue::Integer(_) => Some(tags::INTEGER),
            PropertyValue::Float(_) => Some(tags::NUMBER),
            _ => None,
        };
        if let (Some(tag), Some(text)) = (scalar_tag, value.scalar_text()) {
            property.set_attr("t", tag);
            property.set_text(text);
            return Ok(true);
        }

        let codec = value
            .class_tag()
            .and_then(|tag| self.registry.resolve(tag))
            .or_else(|| self.registry.resolve_by_type(value.type_key()));
        let Some(codec) = codec else {
            tracing::debug!(
                type_key = %value.type_key(),
                class_tag = ?value.class_tag(),
                "No codec for value, omitting property"
            );
            return Ok(false);
        };

        property.set_attr("t", codec.type_tag());
        codec.encode(self, value, property)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::ObjectValue;

    #[test]
    fn untagged_property_decodes_as_string() {
        let registry = CodecRegistry::with_builtins();
        let loader = PropertyLoader::new(&registry);
        let property = Element::new(PROPERTY).with_attr("n", "text").with_text("hello");
        assert_eq!(
            loader.decode_value(&property).unwrap(),
            PropertyValue::from("hello")
        );
    }

    #[test]
    fn reference_key_without_table_falls_back_to_text() {
        let registry = CodecRegistry::with_builtins();
        let loader = PropertyLoader::new(&registry);
        let property = Element::new(PROPERTY).with_attr("r", "k1");
        assert_eq!(
            loader.decode_value(&property).unwrap(),
            PropertyValue::from("")
        );
    }

    #[test]
    fn explicit_tag_takes_precedence_over_reference() {
        let registry = CodecRegistry::with_builtins();
        let mut references = ReferenceTable::new();
        references.insert("k1", PropertyValue::from("referenced"));
        let loader = PropertyLoader::new(&registry).with_references(&references);

        let property = Element::new(PROPERTY)
            .with_attr("t", "i")
            .with_attr("r", "k1")
            .with_text("12");
        assert_eq!(loader.decode_value(&property).unwrap(), PropertyValue::from(12));
    }

    #[test]
    fn writer_skips_null_and_unknown_types() {
        let registry = CodecRegistry::with_builtins();
        let writer = PropertyWriter::new(&registry);

        assert!(writer
            .write_property("a", None, &PropertyValue::Null)
            .unwrap()
            .is_none());
        let unknown = PropertyValue::from(ObjectValue::new("Hologram"));
        assert!(writer.write_property("b", None, &unknown).unwrap().is_none());
    }

    #[test]
    fn writer_tags_non_string_scalars() {
        let registry = CodecRegistry::with_builtins();
        let writer = PropertyWriter::new(&registry);

        let property = writer
            .write_property("count", Some(2), &PropertyValue::from(7))
            .unwrap()
            .expect("written");
        assert_eq!(property.attr("t"), Some("i"));
        assert_eq!(property.attr("x"), Some("2"));
        assert_eq!(property.text(), "7");

        let text = writer
            .write_property("label", None, &PropertyValue::from("hi"))
            .unwrap()
            .expect("written");
        assert_eq!(text.attr("t"), None);
    }

    #[test]
    fn writer_emits_reference_for_known_values() {
        let registry = CodecRegistry::with_builtins();
        let mut references = ReferenceTable::new();
        let map = PropertyValue::Map(BTreeMap::from([(
            "a".to_string(),
            PropertyValue::from("x"),
        )]));
        references.insert("k7", map.clone());
        let writer = PropertyWriter::new(&registry).with_references(&references);

        let property = writer.write_property("data", None, &map).unwrap().unwrap();
        assert_eq!(property.attr("r"), Some("k7"));
        assert!(property.children().is_empty());
    }
}
