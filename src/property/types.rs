//! Composite property value types and their text forms.
//!
//! Each type with a textual wire form implements `FromStr` and `Display`
//! so the codecs stay thin.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::property::PropertyValue;

/// A text form could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value '{text}'")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub text: String,
}

impl ParseValueError {
    pub fn new(kind: &'static str, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// Units of an [`Extent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Pixel,
    Percent,
    Point,
    Centimeter,
    Millimeter,
    Inch,
    Em,
    Ex,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Pixel => "px",
            Units::Percent => "%",
            Units::Point => "pt",
            Units::Centimeter => "cm",
            Units::Millimeter => "mm",
            Units::Inch => "in",
            Units::Em => "em",
            Units::Ex => "ex",
        }
    }

    const ALL: [Units; 8] = [
        Units::Pixel,
        Units::Percent,
        Units::Point,
        Units::Centimeter,
        Units::Millimeter,
        Units::Inch,
        Units::Em,
        Units::Ex,
    ];
}

/// A length with units, e.g. `10px` or `50%`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub value: f64,
    pub units: Units,
}

impl Extent {
    pub fn new(value: f64, units: Units) -> Self {
        Self { value, units }
    }

    pub fn px(value: f64) -> Self {
        Self::new(value, Units::Pixel)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.units.as_str())
    }
}

impl FromStr for Extent {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let units = Units::ALL
            .into_iter()
            .find(|u| text.ends_with(u.as_str()))
            .ok_or_else(|| ParseValueError::new("extent", s))?;
        let number = &text[..text.len() - units.as_str().len()];
        let value = number
            .parse::<f64>()
            .map_err(|_| ParseValueError::new("extent", s))?;
        Ok(Self { value, units })
    }
}

/// RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(u32::from(red) << 16 | u32::from(green) << 8 | u32::from(blue))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0x00ff_ffff)
    }
}

impl FromStr for Color {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| ParseValueError::new("color", s))?;
        u32::from_str_radix(hex, 16)
            .map(Color)
            .map_err(|_| ParseValueError::new("color", s))
    }
}

/// Horizontal alignment axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    Leading,
    Trailing,
    Left,
    Center,
    Right,
}

impl HorizontalAlignment {
    pub fn as_str(self) -> &'static str {
        match self {
            HorizontalAlignment::Leading => "leading",
            HorizontalAlignment::Trailing => "trailing",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
        }
    }
}

impl FromStr for HorizontalAlignment {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leading" => Ok(HorizontalAlignment::Leading),
            "trailing" => Ok(HorizontalAlignment::Trailing),
            "left" => Ok(HorizontalAlignment::Left),
            "center" => Ok(HorizontalAlignment::Center),
            "right" => Ok(HorizontalAlignment::Right),
            _ => Err(ParseValueError::new("horizontal alignment", s)),
        }
    }
}

/// Vertical alignment axis. On the wire `center` denotes `Middle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    Top,
    Middle,
    Bottom,
}

impl VerticalAlignment {
    pub fn as_str(self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Middle => "center",
            VerticalAlignment::Bottom => "bottom",
        }
    }
}

impl FromStr for VerticalAlignment {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(VerticalAlignment::Top),
            "center" => Ok(VerticalAlignment::Middle),
            "bottom" => Ok(VerticalAlignment::Bottom),
            _ => Err(ParseValueError::new("vertical alignment", s)),
        }
    }
}

/// Alignment. A value with only one axis set is that axis's bare value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Horizontal(HorizontalAlignment),
    Vertical(VerticalAlignment),
    Both(HorizontalAlignment, VerticalAlignment),
}

impl Alignment {
    /// Combine optional axes; `None` when neither axis is present.
    pub fn from_axes(
        horizontal: Option<HorizontalAlignment>,
        vertical: Option<VerticalAlignment>,
    ) -> Option<Self> {
        match (horizontal, vertical) {
            (Some(h), Some(v)) => Some(Alignment::Both(h, v)),
            (Some(h), None) => Some(Alignment::Horizontal(h)),
            (None, Some(v)) => Some(Alignment::Vertical(v)),
            (None, None) => None,
        }
    }

    pub fn horizontal(&self) -> Option<HorizontalAlignment> {
        match *self {
            Alignment::Horizontal(h) | Alignment::Both(h, _) => Some(h),
            Alignment::Vertical(_) => None,
        }
    }

    pub fn vertical(&self) -> Option<VerticalAlignment> {
        match *self {
            Alignment::Vertical(v) | Alignment::Both(_, v) => Some(v),
            Alignment::Horizontal(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl BorderStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            BorderStyle::None => "none",
            BorderStyle::Solid => "solid",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Dotted => "dotted",
            BorderStyle::Double => "double",
            BorderStyle::Groove => "groove",
            BorderStyle::Ridge => "ridge",
            BorderStyle::Inset => "inset",
            BorderStyle::Outset => "outset",
        }
    }
}

impl FromStr for BorderStyle {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(BorderStyle::None),
            "solid" => Ok(BorderStyle::Solid),
            "dashed" => Ok(BorderStyle::Dashed),
            "dotted" => Ok(BorderStyle::Dotted),
            "double" => Ok(BorderStyle::Double),
            "groove" => Ok(BorderStyle::Groove),
            "ridge" => Ok(BorderStyle::Ridge),
            "inset" => Ok(BorderStyle::Inset),
            "outset" => Ok(BorderStyle::Outset),
            _ => Err(ParseValueError::new("border style", s)),
        }
    }
}

/// One border side: `"<size> <style> [#color]"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderSide {
    pub size: Extent,
    pub style: BorderStyle,
    pub color: Option<Color>,
}

impl BorderSide {
    pub fn new(size: Extent, style: BorderStyle, color: Option<Color>) -> Self {
        Self { size, style, color }
    }
}

impl fmt::Display for BorderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.size, self.style.as_str())?;
        if let Some(color) = self.color {
            write!(f, " {}", color)?;
        }
        Ok(())
    }
}

impl FromStr for BorderSide {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(size), Some(style)) = (parts.next(), parts.next()) else {
            return Err(ParseValueError::new("border side", s));
        };
        let color = parts.next().map(str::parse::<Color>).transpose()?;
        if parts.next().is_some() {
            return Err(ParseValueError::new("border side", s));
        }
        Ok(Self {
            size: size.parse()?,
            style: style.parse()?,
            color,
        })
    }
}

/// A border: one shorthand side, or up to four sides in top, right, bottom,
/// left order (always starting at top, no gaps).
#[derive(Debug, Clone, PartialEq)]
pub enum Border {
    Uniform(BorderSide),
    Sides(Vec<BorderSide>),
}

/// Typeface of a [`Font`]: a single name or an ordered fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Typeface {
    Single(String),
    Chain(Vec<String>),
}

impl Typeface {
    /// `None` for an empty list, a single name for one entry.
    pub fn from_names(mut names: Vec<String>) -> Option<Self> {
        match names.len() {
            0 => None,
            1 => names.pop().map(Typeface::Single),
            _ => Some(Typeface::Chain(names)),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            Typeface::Single(name) => vec![name.as_str()],
            Typeface::Chain(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    pub typeface: Option<Typeface>,
    pub size: Option<Extent>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub overline: bool,
    pub line_through: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageReference {
    pub url: String,
    pub width: Option<Extent>,
    pub height: Option<Extent>,
}

impl ImageReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
        }
    }
}

/// Tiling of a [`FillImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repeat {
    NoRepeat,
    Horizontal,
    Vertical,
    Both,
}

impl Repeat {
    pub fn as_str(self) -> &'static str {
        match self {
            Repeat::NoRepeat => "0",
            Repeat::Horizontal => "x",
            Repeat::Vertical => "y",
            Repeat::Both => "xy",
        }
    }
}

impl FromStr for Repeat {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Repeat::NoRepeat),
            "x" => Ok(Repeat::Horizontal),
            "y" => Ok(Repeat::Vertical),
            "xy" => Ok(Repeat::Both),
            _ => Err(ParseValueError::new("repeat", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillImage {
    pub image: ImageReference,
    pub repeat: Option<Repeat>,
    pub x: Option<Extent>,
    pub y: Option<Extent>,
}

impl FillImage {
    pub fn new(image: ImageReference) -> Self {
        Self {
            image,
            repeat: None,
            x: None,
            y: None,
        }
    }
}

/// Segment names of a [`FillImageBorder`], in wire order.
pub const BORDER_SEGMENTS: [&str; 8] = [
    "top-left",
    "top",
    "top-right",
    "left",
    "right",
    "bottom-left",
    "bottom",
    "bottom-right",
];

/// Border drawn from images. `images` holds either no segments or exactly
/// one (possibly empty) slot per entry of [`BORDER_SEGMENTS`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillImageBorder {
    pub color: Option<Color>,
    pub border_insets: Option<Insets>,
    pub content_insets: Option<Insets>,
    pub images: Vec<Option<FillImage>>,
}

impl FillImageBorder {
    /// Image of a named segment, if one is set.
    pub fn segment(&self, name: &str) -> Option<&FillImage> {
        let index = BORDER_SEGMENTS.iter().position(|s| *s == name)?;
        self.images.get(index).and_then(Option::as_ref)
    }
}

/// Insets in top, right, bottom, left order. Text accepts 1-4 extents
/// following CSS shorthand rules and always writes all four.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub top: Extent,
    pub right: Extent,
    pub bottom: Extent,
    pub left: Extent,
}

impl Insets {
    pub fn uniform(extent: Extent) -> Self {
        Self {
            top: extent,
            right: extent,
            bottom: extent,
            left: extent,
        }
    }
}

impl fmt::Display for Insets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

impl FromStr for Insets {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let extents = s
            .split_whitespace()
            .map(str::parse::<Extent>)
            .collect::<Result<Vec<_>, _>>()?;
        match extents.as_slice() {
            [all] => Ok(Insets::uniform(*all)),
            [vertical, horizontal] => Ok(Insets {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Insets {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Insets {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(ParseValueError::new("insets", s)),
        }
    }
}

/// A composite contributed by a feature module: an explicit runtime type key,
/// an optional declared class tag and named fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    pub type_key: String,
    pub class_tag: Option<String>,
    pub fields: BTreeMap<String, PropertyValue>,
}

impl ObjectValue {
    pub fn new(type_key: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            class_tag: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_class_tag(mut self, tag: impl Into<String>) -> Self {
        self.class_tag = Some(tag.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}
