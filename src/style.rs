//! Style sheets: named, optionally typed property bags.
//!
//! ```text
//! <ss>
//!   <s n="Title" t="Label"><p n="font" t="Font">...</p></s>
//!   <s n="Default"><p n="foreground" t="Color">#000000</p></s>
//! </ss>
//! ```

use std::collections::BTreeMap;

use crate::codec::{CodecRegistry, ReferenceTable};
use crate::property::PropertyBag;
use crate::tree::{required, ComponentRegistry, TreeDecoder, TreeEncoder, TreeError};
use crate::wire::{Element, STYLE, STYLE_SHEET};

/// Lookup key of a style: name plus optional component type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleKey {
    pub name: String,
    pub component_type: Option<String>,
}

impl StyleKey {
    pub fn new(name: impl Into<String>, component_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            component_type: component_type.map(str::to_string),
        }
    }
}

/// `(name, type)` → property bag. Adding a style under an existing key
/// replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    styles: BTreeMap<StyleKey, PropertyBag>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_style(&mut self, key: StyleKey, style: PropertyBag) {
        if self.styles.insert(key.clone(), style).is_some() {
            tracing::debug!(name = %key.name, component_type = ?key.component_type, "Style replaced");
        }
    }

    pub fn style(&self, name: &str, component_type: Option<&str>) -> Option<&PropertyBag> {
        self.styles.get(&StyleKey::new(name, component_type))
    }

    /// Typed style first, then the untyped one of the same name.
    pub fn resolve(&self, name: &str, component_type: &str) -> Option<&PropertyBag> {
        self.style(name, Some(component_type))
            .or_else(|| self.style(name, None))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, &PropertyBag)> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Decode a style-sheet element.
pub fn load_style_sheet(
    document: &Element,
    registry: &CodecRegistry,
    references: Option<&ReferenceTable>,
) -> Result<StyleSheet, TreeError> {
    if document.name() != STYLE_SHEET {
        return Err(TreeError::UnexpectedElement {
            expected: STYLE_SHEET,
            found: document.name().to_string(),
        });
    }

    let factory = ComponentRegistry::new();
    let mut decoder = TreeDecoder::new(&factory, registry);
    if let Some(references) = references {
        decoder = decoder.with_references(references);
    }

    let mut sheet = StyleSheet::new();
    for style in document.children_named(STYLE) {
        let name = required(style, "n")?;
        let mut bag = PropertyBag::new();
        decoder.decode_properties_into(style, &mut bag)?;
        sheet.add_style(StyleKey::new(name, style.attr("t")), bag);
    }
    Ok(sheet)
}

/// Encode a style sheet in key order.
pub fn encode_style_sheet(
    sheet: &StyleSheet,
    registry: &CodecRegistry,
) -> Result<Element, TreeError> {
    let encoder = TreeEncoder::new(registry);
    let mut document = Element::new(STYLE_SHEET);
    for (key, bag) in sheet.iter() {
        let mut style = Element::new(STYLE).with_attr("n", key.name.as_str());
        if let Some(component_type) = &key.component_type {
            style.set_attr("t", component_type.as_str());
        }
        encoder.encode_properties(bag, &mut style)?;
        document.push_child(style);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{Color, PropertyValue};

    fn load(xml: &str) -> Result<StyleSheet, TreeError> {
        let registry = CodecRegistry::with_builtins();
        load_style_sheet(&Element::parse(xml).unwrap(), &registry, None)
    }

    #[test]
    fn typed_style_shadows_untyped() {
        let sheet = load(
            r##"<ss>
                 <s n="Title" t="Label"><p n="foreground" t="Color">#ff0000</p></s>
                 <s n="Title"><p n="foreground" t="Color">#000000</p></s>
               </ss>"##,
        )
        .unwrap();
        assert_eq!(sheet.len(), 2);

        let label = sheet.resolve("Title", "Label").unwrap();
        assert_eq!(
            label.get("foreground"),
            Some(&PropertyValue::Color(Color::rgb(0xff, 0, 0)))
        );
        let button = sheet.resolve("Title", "Button").unwrap();
        assert_eq!(
            button.get("foreground"),
            Some(&PropertyValue::Color(Color::rgb(0, 0, 0)))
        );
        assert!(sheet.resolve("Missing", "Label").is_none());
    }

    #[test]
    fn later_style_with_same_key_wins() {
        let sheet = load(
            r#"<ss><s n="A"><p n="x">first</p></s><s n="A"><p n="y">second</p></s></ss>"#,
        )
        .unwrap();
        let style = sheet.style("A", None).unwrap();
        assert!(style.get("x").is_none());
        assert_eq!(style.get("y"), Some(&PropertyValue::from("second")));
    }

    #[test]
    fn style_without_name_is_fatal() {
        let err = load(r#"<ss><s><p n="x">1</p></s></ss>"#).unwrap_err();
        assert!(matches!(err, TreeError::MissingAttribute { attribute: "n", .. }));
    }

    #[test]
    fn wrong_root_is_rejected() {
        let err = load(r#"<c t="Label" i="1"/>"#).unwrap_err();
        assert!(matches!(err, TreeError::UnexpectedElement { expected: STYLE_SHEET, .. }));
    }

    #[test]
    fn encoded_sheet_loads_back() {
        let registry = CodecRegistry::with_builtins();
        let mut bag = PropertyBag::new();
        bag.set("text", PropertyValue::from("hello"));
        bag.set_indexed("items", 1, PropertyValue::from(3));
        let mut sheet = StyleSheet::new();
        sheet.add_style(StyleKey::new("Default", Some("Label")), bag);

        let element = encode_style_sheet(&sheet, &registry).unwrap();
        let reloaded = load_style_sheet(&element, &registry, None).unwrap();
        assert_eq!(reloaded, sheet);
    }
}
