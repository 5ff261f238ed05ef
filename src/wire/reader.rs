use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::wire::{Element, WireError, DEFAULT_MAX_DEPTH};

impl Element {
    /// Parse a wire document into its root element.
    ///
    /// Declarations, comments and processing instructions are skipped. Text
    /// is kept verbatim (no trimming) so string values survive untouched.
    /// Nesting is limited to [`DEFAULT_MAX_DEPTH`] levels.
    pub fn parse(xml: &str) -> Result<Element, WireError> {
        Self::parse_with_max_depth(xml, DEFAULT_MAX_DEPTH)
    }

    /// Like [`Element::parse`], rejecting documents nested deeper than
    /// `max_depth` elements (the root counts as one).
    pub fn parse_with_max_depth(xml: &str, max_depth: usize) -> Result<Element, WireError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    check_depth(&stack, max_depth)?;
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    check_depth(&stack, max_depth)?;
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    // quick-xml validates end names, so the stack top is the match
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element)?;
                    }
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&String::from_utf8_lossy(&data));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(WireError::Unclosed {
                name: open.name().to_string(),
            });
        }

        root.ok_or(WireError::EmptyDocument)
    }
}

fn check_depth(stack: &[Element], max_depth: usize) -> Result<(), WireError> {
    if stack.len() >= max_depth {
        return Err(WireError::TooDeep { limit: max_depth });
    }
    Ok(())
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, WireError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?;
        element.set_attr(&key, value.into_owned());
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), WireError> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(WireError::MultipleRoots);
    }
    *root = Some(element);
    Ok(())
}
