use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::wire::{Element, WireError};

impl Element {
    /// Serialize this element (and its subtree) as compact XML.
    pub fn to_xml_string(&self) -> Result<String, WireError> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), WireError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key, value));
    }

    if element.children().is_empty() && element.text().is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;
    if !element.text().is_empty() {
        write_event(writer, Event::Text(BytesText::new(element.text())))?;
    }
    for child in element.children() {
        write_element(writer, child)?;
    }
    write_event(writer, Event::End(BytesEnd::new(element.name())))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), WireError> {
    writer
        .write_event(event)
        .map_err(|e| WireError::Write(e.to_string()))
}
