//! Property values, composite value types and property bags.

mod bag;
pub mod types;
mod value;

pub use bag::{PropertyBag, PropertyEntry};
pub use types::{
    Alignment, Border, BorderSide, BorderStyle, Color, Extent, FillImage, FillImageBorder, Font,
    HorizontalAlignment, ImageReference, Insets, ObjectValue, ParseValueError, Repeat, Typeface,
    Units, VerticalAlignment, BORDER_SEGMENTS,
};
pub use value::{type_keys, PropertyValue};
