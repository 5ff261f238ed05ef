//! Client and server message envelopes.
//!
//! ```text
//! <cmsg i="5">                       i = transaction id the client last saw
//!   <p i="c_7" n="text">hello</p>    property update for component 7
//!   <e i="c_9" t="action"/>          event fired on component 9
//! </cmsg>
//!
//! <smsg i="6" resync="true"><c .../></smsg>
//! ```

use crate::codec::CodecRegistry;
use crate::gate::GateError;
use crate::session::SessionContext;
use crate::tree::{ComponentNode, TreeEncoder, TreeError};
use crate::wire::{Element, CLIENT_MESSAGE, EVENT, PROPERTY, SERVER_MESSAGE};

/// One entry of a client batch, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientItem {
    /// Property element addressed to a client render id. The element is
    /// decoded by the gate.
    Property { component: String, element: Element },
    Event { component: String, event_type: String },
}

/// A batch of client mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMessage {
    pub transaction_id: u64,
    pub items: Vec<ClientItem>,
}

impl ClientMessage {
    pub fn new(transaction_id: u64) -> Self {
        Self {
            transaction_id,
            items: Vec::new(),
        }
    }

    /// Add a property update. `property` is a regular property element; its
    /// `i` attribute is set from `component`.
    pub fn with_property(mut self, component: &str, property: Element) -> Self {
        self.items.push(ClientItem::Property {
            component: component.to_string(),
            element: property,
        });
        self
    }

    pub fn with_event(mut self, component: &str, event_type: &str) -> Self {
        self.items.push(ClientItem::Event {
            component: component.to_string(),
            event_type: event_type.to_string(),
        });
        self
    }

    pub fn parse(xml: &str) -> Result<Self, GateError> {
        Self::from_element(&Element::parse(xml)?)
    }

    pub fn parse_with_max_depth(xml: &str, max_depth: usize) -> Result<Self, GateError> {
        Self::from_element(&Element::parse_with_max_depth(xml, max_depth)?)
    }

    pub fn from_element(element: &Element) -> Result<Self, GateError> {
        if element.name() != CLIENT_MESSAGE {
            return Err(GateError::MalformedMessage(format!(
                "expected <{}>, found <{}>",
                CLIENT_MESSAGE,
                element.name()
            )));
        }
        let transaction_id = element
            .attr("i")
            .ok_or_else(|| GateError::MalformedMessage("missing transaction id".to_string()))?;
        let transaction_id = transaction_id.trim().parse::<u64>().map_err(|_| {
            GateError::MalformedMessage(format!("invalid transaction id '{}'", transaction_id))
        })?;

        let mut items = Vec::new();
        for child in element.children() {
            match child.name() {
                PROPERTY => items.push(ClientItem::Property {
                    component: target(child)?.to_string(),
                    element: child.clone(),
                }),
                EVENT => {
                    let event_type = child.attr("t").ok_or_else(|| {
                        GateError::MalformedMessage("event without type".to_string())
                    })?;
                    items.push(ClientItem::Event {
                        component: target(child)?.to_string(),
                        event_type: event_type.to_string(),
                    });
                }
                other => {
                    tracing::trace!(element = %other, "Skipping unknown client message element");
                }
            }
        }

        Ok(Self {
            transaction_id,
            items,
        })
    }

    pub fn to_element(&self) -> Element {
        let mut message =
            Element::new(CLIENT_MESSAGE).with_attr("i", self.transaction_id.to_string());
        for item in &self.items {
            match item {
                ClientItem::Property { component, element } => {
                    let mut property = element.clone();
                    property.set_attr("i", component.as_str());
                    message.push_child(property);
                }
                ClientItem::Event {
                    component,
                    event_type,
                } => message.push_child(
                    Element::new(EVENT)
                        .with_attr("i", component.as_str())
                        .with_attr("t", event_type.as_str()),
                ),
            }
        }
        message
    }
}

fn target(element: &Element) -> Result<&str, GateError> {
    element.attr("i").ok_or_else(|| {
        GateError::MalformedMessage(format!("<{}> without component id", element.name()))
    })
}

/// An outgoing server batch, stamped with a fresh transaction id.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerMessage {
    pub transaction_id: u64,
    /// Client must discard its mirror and rebuild from `components`.
    pub resync: bool,
    pub components: Vec<Element>,
}

impl ServerMessage {
    /// Encode `changed` components. Advances the session's transaction
    /// counter only when encoding succeeds.
    pub fn build(
        session: &mut SessionContext,
        changed: &[&ComponentNode],
        registry: &CodecRegistry,
    ) -> Result<Self, TreeError> {
        let encoder = TreeEncoder::new(registry);
        let components = changed
            .iter()
            .map(|node| encoder.encode_component(node))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            transaction_id: session.next_transaction_id(),
            resync: false,
            components,
        })
    }

    /// The whole tree of the session.
    pub fn full(session: &mut SessionContext, registry: &CodecRegistry) -> Result<Self, GateError> {
        let root = TreeEncoder::new(registry).encode_component(session.root()?)?;
        Ok(Self {
            transaction_id: session.next_transaction_id(),
            resync: false,
            components: vec![root],
        })
    }

    /// Full tree flagged as a resynchronization.
    pub fn resync(
        session: &mut SessionContext,
        registry: &CodecRegistry,
    ) -> Result<Self, GateError> {
        let mut message = Self::full(session, registry)?;
        message.resync = true;
        Ok(message)
    }

    pub fn to_element(&self) -> Element {
        let mut message =
            Element::new(SERVER_MESSAGE).with_attr("i", self.transaction_id.to_string());
        if self.resync {
            message.set_attr("resync", "true");
        }
        for component in &self.components {
            message.push_child(component.clone());
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireError;

    #[test]
    fn parses_properties_and_events_in_order() {
        let message = ClientMessage::parse(
            r#"<cmsg i="5"><p i="c_7" n="text">hello</p><x/><e i="c_9" t="action"/></cmsg>"#,
        )
        .unwrap();
        assert_eq!(message.transaction_id, 5);
        assert_eq!(message.items.len(), 2);
        assert!(matches!(
            &message.items[1],
            ClientItem::Event { component, event_type } if component == "c_9" && event_type == "action"
        ));
    }

    #[test]
    fn rejects_missing_or_bad_transaction_id() {
        assert!(matches!(
            ClientMessage::parse(r#"<cmsg><e i="c_1" t="a"/></cmsg>"#),
            Err(GateError::MalformedMessage(_))
        ));
        assert!(matches!(
            ClientMessage::parse(r#"<cmsg i="five"/>"#),
            Err(GateError::MalformedMessage(_))
        ));
        assert!(matches!(
            ClientMessage::parse(r#"<cmsg i="1"><p n="text">x</p></cmsg>"#),
            Err(GateError::MalformedMessage(_))
        ));
    }

    #[test]
    fn nesting_limit_applies_to_client_messages() {
        let xml = r#"<cmsg i="1"><p i="c_1" n="m" t="Map"><p n="a">x</p></p></cmsg>"#;
        assert!(ClientMessage::parse_with_max_depth(xml, 3).is_ok());
        assert!(matches!(
            ClientMessage::parse_with_max_depth(xml, 2),
            Err(GateError::Wire(WireError::TooDeep { limit: 2 }))
        ));
    }

    #[test]
    fn builder_output_parses_back() {
        let message = ClientMessage::new(3)
            .with_property("c_1", Element::new(PROPERTY).with_attr("n", "text").with_text("a"))
            .with_event("c_2", "action");
        let reparsed = ClientMessage::from_element(&message.to_element()).unwrap();
        assert_eq!(reparsed.transaction_id, 3);
        assert_eq!(reparsed.items.len(), 2);
    }
}
