//! Transaction consistency gate.
//!
//! A client batch carries the transaction id the client last observed. If
//! that is not the session's current id the client is looking at a
//! superseded state (second tab, retried request) and the whole batch is
//! refused with a [`ResyncDirective`]. Otherwise every update is resolved
//! and decoded against a copy of the tree, and the copy replaces the
//! session's tree only once the whole batch went through.

mod message;

pub use message::{ClientItem, ClientMessage, ServerMessage};

use thiserror::Error;

use crate::codec::{CodecRegistry, MissingReferencePolicy, ReferenceTable};
use crate::session::{parse_client_render_id, SessionContext, SessionError};
use crate::tree::{
    ComponentFactory, PropertyTarget, TreeDecoder, TreeError, DEFAULT_MAX_PROPERTY_INDEX,
};
use crate::wire::WireError;

/// Fatal problems with a client batch. Stale batches are not errors, see
/// [`GateOutcome::Resync`].
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Malformed client message: {0}")]
    MalformedMessage(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// The client must drop its mirror and reload the full tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncDirective {
    /// Session's current transaction id.
    pub expected: u64,
    /// Id declared by the refused batch.
    pub received: u64,
}

impl ResyncDirective {
    /// The full-tree server message answering this directive.
    pub fn into_message(
        self,
        session: &mut SessionContext,
        registry: &CodecRegistry,
    ) -> Result<ServerMessage, GateError> {
        ServerMessage::resync(session, registry)
    }
}

/// An event the client fired on a component that observes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredEvent {
    pub component: String,
    pub event_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Applied {
        properties: usize,
        events: Vec<FiredEvent>,
    },
    Resync(ResyncDirective),
}

/// Validates client batches and applies them to a session's tree.
pub struct TransactionGate<'a> {
    factory: &'a dyn ComponentFactory,
    registry: &'a CodecRegistry,
    references: Option<&'a ReferenceTable>,
    missing_reference: MissingReferencePolicy,
    max_property_index: usize,
}

impl<'a> TransactionGate<'a> {
    pub fn new(factory: &'a dyn ComponentFactory, registry: &'a CodecRegistry) -> Self {
        Self {
            factory,
            registry,
            references: None,
            missing_reference: MissingReferencePolicy::default(),
            max_property_index: DEFAULT_MAX_PROPERTY_INDEX,
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

    pub fn with_max_property_index(mut self, max_index: usize) -> Self {
        self.max_property_index = max_index;
        self
    }

    pub fn process(
        &self,
        session: &mut SessionContext,
        message: &ClientMessage,
    ) -> Result<GateOutcome, GateError> {
        let current = session.current_transaction_id();
        if message.transaction_id != current {
            tracing::warn!(
                session = %session.id(),
                expected = current,
                received = message.transaction_id,
                "Stale client transaction, requesting resync"
            );
            return Ok(GateOutcome::Resync(ResyncDirective {
                expected: current,
                received: message.transaction_id,
            }));
        }

        let mut decoder = TreeDecoder::new(self.factory, self.registry)
            .with_missing_reference_policy(self.missing_reference)
            .with_max_property_index(self.max_property_index);
        if let Some(references) = self.references {
            decoder = decoder.with_references(references);
        }

        let mut tree = session.root()?.clone();
        let mut properties = 0;
        let mut events = Vec::new();

        for item in &message.items {
            match item {
                ClientItem::Property { component, element } => {
                    let id = parse_client_render_id(component)?;
                    let node = tree
                        .find_mut(id)
                        .ok_or_else(|| SessionError::UnknownComponent(id.to_string()))?;
                    let kind = self
                        .factory
                        .kind(&node.kind)
                        .ok_or_else(|| TreeError::UnknownComponentType(node.kind.clone()))?;
                    let update = decoder.decode_property(element)?;
                    if !kind.accepts_input(node) {
                        tracing::warn!(component = %id, "Ignoring client update for component that refuses input");
                        continue;
                    }
                    update.apply(PropertyTarget::Node {
                        node,
                        kind: kind.as_ref(),
                    })?;
                    properties += 1;
                }
                ClientItem::Event {
                    component,
                    event_type,
                } => {
                    let id = parse_client_render_id(component)?;
                    let node = tree
                        .find(id)
                        .ok_or_else(|| SessionError::UnknownComponent(id.to_string()))?;
                    if !node.observes(event_type) {
                        tracing::debug!(component = %id, event = %event_type, "Event not observed, skipping");
                        continue;
                    }
                    let accepts = self
                        .factory
                        .kind(&node.kind)
                        .is_some_and(|kind| kind.accepts_input(node));
                    if !accepts {
                        tracing::warn!(component = %id, event = %event_type, "Ignoring event on component that refuses input");
                        continue;
                    }
                    events.push(FiredEvent {
                        component: id.to_string(),
                        event_type: event_type.clone(),
                    });
                }
            }
        }

        *session.root_mut()? = tree;
        tracing::debug!(
            session = %session.id(),
            transaction_id = current,
            properties,
            events = events.len(),
            "Client batch applied"
        );
        Ok(GateOutcome::Applied { properties, events })
    }
}
