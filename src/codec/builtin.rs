//! Built-in scalar and composite codecs.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use time::macros::format_description;
use time::Date;

use crate::codec::{tags, CodecError, CodecRegistry, PropertyCodec, PropertyLoader, PropertyWriter};
use crate::property::{
    type_keys, Alignment, Border, BorderSide, Color, Extent, FillImage, FillImageBorder, Font,
    ImageReference, Insets, ObjectValue, ParseValueError, PropertyValue, Typeface,
    BORDER_SEGMENTS,
};
use crate::wire::Element;

const BORDER_SIDES: [&str; 4] = ["t", "r", "b", "l"];

/// Register every built-in codec under its tag and runtime type key.
pub fn register_builtins(registry: &CodecRegistry) {
    registry.register_both(
        type_keys::BOOLEAN,
        Arc::new(ScalarCodec {
            tag: tags::BOOLEAN,
            kind: "boolean",
            parse: |text| text.trim().parse().ok().map(PropertyValue::Boolean),
        }),
    );
    registry.register_both(
        type_keys::INTEGER,
        Arc::new(ScalarCodec {
            tag: tags::INTEGER,
            kind: "integer",
            parse: |text| text.trim().parse().ok().map(PropertyValue::Integer),
        }),
    );
    registry.register_both(
        type_keys::FLOAT,
        Arc::new(ScalarCodec {
            tag: tags::NUMBER,
            kind: "number",
            parse: |text| text.trim().parse().ok().map(PropertyValue::Float),
        }),
    );
    registry.register_both(
        type_keys::STRING,
        Arc::new(ScalarCodec {
            tag: tags::STRING,
            kind: "string",
            parse: |text| Some(PropertyValue::from(text)),
        }),
    );

    registry.register_both(
        type_keys::COLOR,
        Arc::new(TextCodec::<Color> {
            tag: type_keys::COLOR,
            wrap: PropertyValue::Color,
            unwrap: |value| match value {
                PropertyValue::Color(color) => Some(color),
                _ => None,
            },
        }),
    );
    registry.register_both(
        type_keys::EXTENT,
        Arc::new(TextCodec::<Extent> {
            tag: type_keys::EXTENT,
            wrap: PropertyValue::Extent,
            unwrap: |value| match value {
                PropertyValue::Extent(extent) => Some(extent),
                _ => None,
            },
        }),
    );
    registry.register_both(
        type_keys::INSETS,
        Arc::new(TextCodec::<Insets> {
            tag: type_keys::INSETS,
            wrap: PropertyValue::Insets,
            unwrap: |value| match value {
                PropertyValue::Insets(insets) => Some(insets),
                _ => None,
            },
        }),
    );

    registry.register_both(type_keys::ALIGNMENT, Arc::new(AlignmentCodec));
    registry.register_both(type_keys::BORDER, Arc::new(BorderCodec));
    registry.register_both(type_keys::FONT, Arc::new(FontCodec));
    registry.register_both(type_keys::IMAGE_REFERENCE, Arc::new(ImageReferenceCodec));
    registry.register_both(type_keys::FILL_IMAGE, Arc::new(FillImageCodec));
    registry.register_both(type_keys::FILL_IMAGE_BORDER, Arc::new(FillImageBorderCodec));
    registry.register_both(type_keys::DATE, Arc::new(DateCodec));
    registry.register_both(type_keys::MAP, Arc::new(MapCodec));
}

fn invalid(tag: &str) -> impl FnOnce(ParseValueError) -> CodecError + '_ {
    move |source| CodecError::InvalidValue {
        tag: tag.to_string(),
        source,
    }
}

fn unexpected(tag: &str, value: &PropertyValue) -> CodecError {
    CodecError::UnexpectedValue {
        tag: tag.to_string(),
        found: value.type_key().to_string(),
    }
}

fn body<'e>(parent: &'e Element, child: &'static str) -> Result<&'e Element, CodecError> {
    parent.child(child).ok_or_else(|| CodecError::MissingElement {
        element: parent.name().to_string(),
        child,
    })
}

fn parse_attr<T>(element: &Element, key: &str, tag: &str) -> Result<Option<T>, CodecError>
where
    T: FromStr<Err = ParseValueError>,
{
    element
        .attr(key)
        .map(|text| text.parse::<T>().map_err(invalid(tag)))
        .transpose()
}

fn set_optional(element: &mut Element, key: &str, value: Option<impl Display>) {
    if let Some(value) = value {
        element.set_attr(key, value.to_string());
    }
}

/// Scalars carried as element text.
struct ScalarCodec {
    tag: &'static str,
    kind: &'static str,
    parse: fn(&str) -> Option<PropertyValue>,
}

impl PropertyCodec for ScalarCodec {
    fn type_tag(&self) -> &str {
        self.tag
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        (self.parse)(property.text()).ok_or_else(|| {
            invalid(self.tag)(ParseValueError::new(self.kind, property.text()))
        })
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let text = value
            .scalar_text()
            .ok_or_else(|| unexpected(self.tag, value))?;
        property.set_text(text);
        Ok(())
    }
}

/// Composites whose wire form is their `Display`/`FromStr` text.
struct TextCodec<T> {
    tag: &'static str,
    wrap: fn(T) -> PropertyValue,
    unwrap: fn(&PropertyValue) -> Option<&T>,
}

impl<T> PropertyCodec for TextCodec<T>
where
    T: FromStr<Err = ParseValueError> + Display,
{
    fn type_tag(&self) -> &str {
        self.tag
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        let parsed = property.text().parse::<T>().map_err(invalid(self.tag))?;
        Ok((self.wrap)(parsed))
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let inner = (self.unwrap)(value).ok_or_else(|| unexpected(self.tag, value))?;
        property.set_text(inner.to_string());
        Ok(())
    }
}

/// `<a h=".." v=".."/>`
struct AlignmentCodec;

impl PropertyCodec for AlignmentCodec {
    fn type_tag(&self) -> &str {
        type_keys::ALIGNMENT
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        let a = body(property, "a")?;
        let horizontal = parse_attr(a, "h", self.type_tag())?;
        let vertical = parse_attr(a, "v", self.type_tag())?;
        Ok(Alignment::from_axes(horizontal, vertical)
            .map(PropertyValue::Alignment)
            .unwrap_or(PropertyValue::Null))
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::Alignment(alignment) = value else {
            return Err(unexpected(self.type_tag(), value));
        };
        let mut a = Element::new("a");
        set_optional(&mut a, "h", alignment.horizontal().map(|h| h.as_str()));
        set_optional(&mut a, "v", alignment.vertical().map(|v| v.as_str()));
        property.push_child(a);
        Ok(())
    }
}

/// `<b v="side"/>` or `<b t=".." r=".." b=".." l=".."/>`
struct BorderCodec;

impl PropertyCodec for BorderCodec {
    fn type_tag(&self) -> &str {
        type_keys::BORDER
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        let b = body(property, "b")?;
        if let Some(side) = parse_attr::<BorderSide>(b, "v", self.type_tag())? {
            return Ok(PropertyValue::Border(Border::Uniform(side)));
        }

        if !b.has_attr("t") {
            return Err(CodecError::BorderWithoutTop);
        }
        let mut sides = Vec::with_capacity(BORDER_SIDES.len());
        for key in BORDER_SIDES {
            match parse_attr::<BorderSide>(b, key, self.type_tag())? {
                Some(side) => sides.push(side),
                None => break,
            }
        }
        Ok(PropertyValue::Border(Border::Sides(sides)))
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::Border(border) = value else {
            return Err(unexpected(self.type_tag(), value));
        };
        let mut b = Element::new("b");
        match border {
            Border::Uniform(side) => b.set_attr("v", side.to_string()),
            Border::Sides(sides) => {
                if sides.is_empty() || sides.len() > BORDER_SIDES.len() {
                    return Err(CodecError::Encode {
                        tag: self.type_tag().to_string(),
                        message: format!("expected 1 to 4 sides, got {}", sides.len()),
                    });
                }
                for (key, side) in BORDER_SIDES.iter().zip(sides) {
                    b.set_attr(key, side.to_string());
                }
            }
        }
        property.push_child(b);
        Ok(())
    }
}

/// `<f sz=".." bo="1" it="1" un="1" ov="1" lt="1"><tf>name</tf>*</f>`
struct FontCodec;

const FONT_FLAGS: [&str; 5] = ["bo", "it", "un", "ov", "lt"];

impl PropertyCodec for FontCodec {
    fn type_tag(&self) -> &str {
        type_keys::FONT
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        let f = body(property, "f")?;
        let names = f
            .children_named("tf")
            .map(|tf| tf.text().to_string())
            .collect();
        Ok(PropertyValue::Font(Font {
            typeface: Typeface::from_names(names),
            size: parse_attr(f, "sz", self.type_tag())?,
            bold: f.has_attr("bo"),
            italic: f.has_attr("it"),
            underline: f.has_attr("un"),
            overline: f.has_attr("ov"),
            line_through: f.has_attr("lt"),
        }))
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::Font(font) = value else {
            return Err(unexpected(self.type_tag(), value));
        };
        let mut f = Element::new("f");
        set_optional(&mut f, "sz", font.size);
        let flags = [
            font.bold,
            font.italic,
            font.underline,
            font.overline,
            font.line_through,
        ];
        for (key, set) in FONT_FLAGS.iter().zip(flags) {
            if set {
                f.set_attr(key, "1");
            }
        }
        if let Some(typeface) = &font.typeface {
            for name in typeface.names() {
                f.push_child(Element::new("tf").with_text(name));
            }
        }
        property.push_child(f);
        Ok(())
    }
}

fn decode_image(i: &Element, tag: &str) -> Result<ImageReference, CodecError> {
    let url = i.attr("u").ok_or_else(|| CodecError::MissingAttribute {
        element: i.name().to_string(),
        attribute: "u",
    })?;
    Ok(ImageReference {
        url: url.to_string(),
        width: parse_attr(i, "w", tag)?,
        height: parse_attr(i, "h", tag)?,
    })
}

fn encode_image(image: &ImageReference) -> Element {
    let mut i = Element::new("i").with_attr("u", image.url.as_str());
    set_optional(&mut i, "w", image.width);
    set_optional(&mut i, "h", image.height);
    i
}

fn decode_fill_image(fi: &Element, tag: &str) -> Result<FillImage, CodecError> {
    Ok(FillImage {
        image: decode_image(body(fi, "i")?, tag)?,
        repeat: parse_attr(fi, "rp", tag)?,
        x: parse_attr(fi, "x", tag)?,
        y: parse_attr(fi, "y", tag)?,
    })
}

fn encode_fill_image(fill: &FillImage) -> Element {
    let mut fi = Element::new("fi");
    set_optional(&mut fi, "rp", fill.repeat.map(|r| r.as_str()));
    set_optional(&mut fi, "x", fill.x);
    set_optional(&mut fi, "y", fill.y);
    fi.push_child(encode_image(&fill.image));
    fi
}

/// `<i u="url" w=".." h=".."/>`
struct ImageReferenceCodec;

impl PropertyCodec for ImageReferenceCodec {
    fn type_tag(&self) -> &str {
        type_keys::IMAGE_REFERENCE
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        let image = decode_image(body(property, "i")?, self.type_tag())?;
        Ok(PropertyValue::ImageReference(image))
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::ImageReference(image) = value else {
            return Err(unexpected(self.type_tag(), value));
        };
        property.push_child(encode_image(image));
        Ok(())
    }
}

/// `<fi rp=".." x=".." y=".."><i .../></fi>`
struct FillImageCodec;

impl PropertyCodec for FillImageCodec {
    fn type_tag(&self) -> &str {
        type_keys::FILL_IMAGE
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        let fill = decode_fill_image(body(property, "fi")?, self.type_tag())?;
        Ok(PropertyValue::FillImage(fill))
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::FillImage(fill) = value else {
            return Err(unexpected(self.type_tag(), value));
        };
        property.push_child(encode_fill_image(fill));
        Ok(())
    }
}

/// `<fib bc=".." bi=".." ci="..">` followed by zero or eight `fi`/`nfi`
/// segment children.
struct FillImageBorderCodec;

impl PropertyCodec for FillImageBorderCodec {
    fn type_tag(&self) -> &str {
        type_keys::FILL_IMAGE_BORDER
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        let tag = self.type_tag();
        let fib = body(property, "fib")?;

        let mut images = Vec::new();
        for segment in fib.children() {
            match segment.name() {
                "fi" => images.push(Some(decode_fill_image(segment, tag)?)),
                "nfi" => images.push(None),
                _ => {}
            }
        }
        if !images.is_empty() && images.len() != BORDER_SEGMENTS.len() {
            return Err(CodecError::FillImageBorderCount(images.len()));
        }

        Ok(PropertyValue::FillImageBorder(FillImageBorder {
            color: parse_attr(fib, "bc", tag)?,
            border_insets: parse_attr(fib, "bi", tag)?,
            content_insets: parse_attr(fib, "ci", tag)?,
            images,
        }))
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::FillImageBorder(border) = value else {
            return Err(unexpected(self.type_tag(), value));
        };
        if !border.images.is_empty() && border.images.len() != BORDER_SEGMENTS.len() {
            return Err(CodecError::FillImageBorderCount(border.images.len()));
        }

        let mut fib = Element::new("fib");
        set_optional(&mut fib, "bc", border.color);
        set_optional(&mut fib, "bi", border.border_insets);
        set_optional(&mut fib, "ci", border.content_insets);
        for image in &border.images {
            fib.push_child(match image {
                Some(fill) => encode_fill_image(fill),
                None => Element::new("nfi"),
            });
        }
        property.push_child(fib);
        Ok(())
    }
}

/// Text `YYYY.MM.DD`. Unparseable text decodes to `Null`.
struct DateCodec;

impl PropertyCodec for DateCodec {
    fn type_tag(&self) -> &str {
        type_keys::DATE
    }

    fn decode(
        &self,
        _loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        let text = property.text().trim();
        match Date::parse(text, format_description!("[year].[month].[day]")) {
            Ok(date) => Ok(PropertyValue::Date(date)),
            Err(e) => {
                tracing::debug!(text = %text, error = %e, "Unparseable date, leaving property null");
                Ok(PropertyValue::Null)
            }
        }
    }

    fn encode(
        &self,
        _writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::Date(date) = value else {
            return Err(unexpected(self.type_tag(), value));
        };
        let text = date
            .format(format_description!("[year].[month].[day]"))
            .map_err(|e| CodecError::Encode {
                tag: self.type_tag().to_string(),
                message: e.to_string(),
            })?;
        property.set_text(text);
        Ok(())
    }
}

/// Nested property elements, one per entry. `Null` entries are not written,
/// so they are absent after decoding.
struct MapCodec;

impl PropertyCodec for MapCodec {
    fn type_tag(&self) -> &str {
        type_keys::MAP
    }

    fn decode(
        &self,
        loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        Ok(PropertyValue::Map(loader.decode_named(property)?))
    }

    fn encode(
        &self,
        writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::Map(entries) = value else {
            return Err(unexpected(self.type_tag(), value));
        };
        for (name, entry) in entries {
            if let Some(child) = writer.write_property(name, None, entry)? {
                property.push_child(child);
            }
        }
        Ok(())
    }
}

/// Codec for [`ObjectValue`]s contributed by feature modules: fields travel
/// as nested property elements, the same way map entries do.
///
/// Register with [`CodecRegistry::register_both`] using the object's runtime
/// type key. Decoded objects carry no class tag.
pub struct ObjectCodec {
    tag: String,
    type_key: String,
}

impl ObjectCodec {
    pub fn new(tag: impl Into<String>, type_key: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            type_key: type_key.into(),
        }
    }
}

impl PropertyCodec for ObjectCodec {
    fn type_tag(&self) -> &str {
        &self.tag
    }

    fn decode(
        &self,
        loader: &PropertyLoader<'_>,
        property: &Element,
    ) -> Result<PropertyValue, CodecError> {
        Ok(PropertyValue::Object(ObjectValue {
            type_key: self.type_key.clone(),
            class_tag: None,
            fields: loader.decode_named(property)?,
        }))
    }

    fn encode(
        &self,
        writer: &PropertyWriter<'_>,
        value: &PropertyValue,
        property: &mut Element,
    ) -> Result<(), CodecError> {
        let PropertyValue::Object(object) = value else {
            return Err(unexpected(&self.tag, value));
        };
        for (name, field) in &object.fields {
            if let Some(child) = writer.write_property(name, None, field)? {
                property.push_child(child);
            }
        }
        Ok(())
    }
}
