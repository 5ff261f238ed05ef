use std::collections::BTreeMap;

use time::Date;

use crate::property::types::{
    Alignment, Border, Color, Extent, FillImage, FillImageBorder, Font, ImageReference, Insets,
    ObjectValue,
};

/// Runtime type keys of the built-in value kinds. Codecs registered by
/// runtime type use these; [`ObjectValue`]s supply their own.
pub mod type_keys {
    pub const NULL: &str = "Null";
    pub const BOOLEAN: &str = "Boolean";
    pub const INTEGER: &str = "Integer";
    pub const FLOAT: &str = "Float";
    pub const STRING: &str = "String";
    pub const ALIGNMENT: &str = "Alignment";
    pub const BORDER: &str = "Border";
    pub const COLOR: &str = "Color";
    pub const EXTENT: &str = "Extent";
    pub const FILL_IMAGE: &str = "FillImage";
    pub const FILL_IMAGE_BORDER: &str = "FillImageBorder";
    pub const FONT: &str = "Font";
    pub const IMAGE_REFERENCE: &str = "ImageReference";
    pub const INSETS: &str = "Insets";
    pub const DATE: &str = "Date";
    pub const MAP: &str = "Map";
}

/// A property value as carried in a property bag.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Alignment(Alignment),
    Border(Border),
    Color(Color),
    Extent(Extent),
    FillImage(FillImage),
    FillImageBorder(FillImageBorder),
    Font(Font),
    ImageReference(ImageReference),
    Insets(Insets),
    Date(Date),
    Map(BTreeMap<String, PropertyValue>),
    Object(ObjectValue),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            PropertyValue::Boolean(_)
                | PropertyValue::Integer(_)
                | PropertyValue::Float(_)
                | PropertyValue::String(_)
        )
    }

    /// Text form of a scalar value.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            PropertyValue::Boolean(b) => Some(b.to_string()),
            PropertyValue::Integer(i) => Some(i.to_string()),
            PropertyValue::Float(f) => Some(f.to_string()),
            PropertyValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Key used to resolve a codec by runtime type.
    pub fn type_key(&self) -> &str {
        match self {
            PropertyValue::Null => type_keys::NULL,
            PropertyValue::Boolean(_) => type_keys::BOOLEAN,
            PropertyValue::Integer(_) => type_keys::INTEGER,
            PropertyValue::Float(_) => type_keys::FLOAT,
            PropertyValue::String(_) => type_keys::STRING,
            PropertyValue::Alignment(_) => type_keys::ALIGNMENT,
            PropertyValue::Border(_) => type_keys::BORDER,
            PropertyValue::Color(_) => type_keys::COLOR,
            PropertyValue::Extent(_) => type_keys::EXTENT,
            PropertyValue::FillImage(_) => type_keys::FILL_IMAGE,
            PropertyValue::FillImageBorder(_) => type_keys::FILL_IMAGE_BORDER,
            PropertyValue::Font(_) => type_keys::FONT,
            PropertyValue::ImageReference(_) => type_keys::IMAGE_REFERENCE,
            PropertyValue::Insets(_) => type_keys::INSETS,
            PropertyValue::Date(_) => type_keys::DATE,
            PropertyValue::Map(_) => type_keys::MAP,
            PropertyValue::Object(object) => object.type_key.as_str(),
        }
    }

    /// Class tag declared by the value itself, consulted before the runtime
    /// type when picking an encoder.
    pub fn class_tag(&self) -> Option<&str> {
        match self {
            PropertyValue::Object(object) => object.class_tag.as_deref(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

macro_rules! impl_from_composite {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_composite!(
    Alignment => Alignment,
    Border => Border,
    Color => Color,
    Extent => Extent,
    FillImage => FillImage,
    FillImageBorder => FillImageBorder,
    Font => Font,
    ImageReference => ImageReference,
    Insets => Insets,
    Date => Date,
    BTreeMap<String, PropertyValue> => Map,
    ObjectValue => Object,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_values_carry_their_own_type_key_and_class_tag() {
        let value = PropertyValue::from(ObjectValue::new("Gradient").with_class_tag("grad"));
        assert_eq!(value.type_key(), "Gradient");
        assert_eq!(value.class_tag(), Some("grad"));
        assert_eq!(PropertyValue::from(Color(0)).class_tag(), None);
    }

    #[test]
    fn scalar_text_forms() {
        assert_eq!(PropertyValue::from(true).scalar_text().as_deref(), Some("true"));
        assert_eq!(PropertyValue::from(42).scalar_text().as_deref(), Some("42"));
        assert_eq!(PropertyValue::from(2.5).scalar_text().as_deref(), Some("2.5"));
        assert_eq!(PropertyValue::Null.scalar_text(), None);
        assert!(!PropertyValue::from(Color(0)).is_scalar());
    }
}
