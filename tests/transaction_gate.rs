mod common;

use std::sync::Arc;

use uisync::gate::{
    ClientMessage, FiredEvent, GateError, GateOutcome, ResyncDirective, ServerMessage,
    TransactionGate,
};
use uisync::property::PropertyValue;
use uisync::session::SessionContext;
use uisync::tree::{ComponentKind, ComponentNode, ComponentRegistry, TreeError};
use uisync::wire::{Element, WireError, DEFAULT_MAX_DEPTH};

fn advance_to(session: &mut SessionContext, transaction_id: u64) {
    while session.current_transaction_id() < transaction_id {
        session.next_transaction_id();
    }
}

#[test]
fn test_current_batch_is_applied_and_next_push_advances() {
    let registry = common::codecs();
    let components = common::components();
    let gate = TransactionGate::new(&components, &registry);
    let mut session = common::sample_session();
    advance_to(&mut session, 5);

    let message = ClientMessage::parse(
        r#"<cmsg i="5">
             <p i="c_3" n="text">Ada</p>
             <p i="c_3" n="history" x="1">b</p>
             <e i="c_4" t="action"/>
           </cmsg>"#,
    )
    .unwrap();
    let outcome = gate.process(&mut session, &message).unwrap();

    assert_eq!(
        outcome,
        GateOutcome::Applied {
            properties: 2,
            events: vec![FiredEvent {
                component: "4".to_string(),
                event_type: "action".to_string(),
            }],
        }
    );
    let field = session.root().unwrap().find("3").unwrap();
    assert_eq!(field.properties.get("text"), Some(&PropertyValue::from("Ada")));
    assert_eq!(field.properties.get_indexed("history", 1), Some(&PropertyValue::from("b")));

    // The gate never advances the counter itself.
    assert_eq!(session.current_transaction_id(), 5);
    let changed = session.root().unwrap().find("3").unwrap().clone();
    let push = ServerMessage::build(&mut session, &[&changed], &registry).unwrap();
    assert_eq!(push.transaction_id, 6);
    assert_eq!(push.to_element().attr("i"), Some("6"));
}

#[test]
fn test_stale_batch_requests_resync_and_leaves_tree() {
    let registry = common::codecs();
    let components = common::components();
    let gate = TransactionGate::new(&components, &registry);
    let mut session = common::sample_session();
    advance_to(&mut session, 5);
    let before = session.root().unwrap().clone();

    let message = ClientMessage::new(4).with_property("c_3", common::text_property("late"));
    let outcome = gate.process(&mut session, &message).unwrap();

    assert_eq!(
        outcome,
        GateOutcome::Resync(ResyncDirective {
            expected: 5,
            received: 4,
        })
    );
    assert_eq!(session.root().unwrap(), &before);
    assert_eq!(session.current_transaction_id(), 5);
}

#[test]
fn test_resync_reply_carries_full_tree() {
    let registry = common::codecs();
    let mut session = common::sample_session();
    advance_to(&mut session, 3);

    let directive = ResyncDirective {
        expected: 3,
        received: 1,
    };
    let reply = directive.into_message(&mut session, &registry).unwrap();
    let element = reply.to_element();

    assert_eq!(element.name(), "smsg");
    assert_eq!(element.attr("i"), Some("4"));
    assert_eq!(element.attr("resync"), Some("true"));
    assert_eq!(element.children()[0].attr("i"), Some("0"));
}

#[test]
fn test_batch_is_all_or_nothing() {
    let registry = common::codecs();
    let components = common::components();
    let gate = TransactionGate::new(&components, &registry);
    let mut session = common::sample_session();
    let before = session.root().unwrap().clone();

    let message = ClientMessage::new(0)
        .with_property("c_3", common::text_property("applied first"))
        .with_property(
            "c_2",
            Element::new("p").with_attr("n", "font").with_attr("t", "Nope"),
        );
    let err = gate.process(&mut session, &message).unwrap_err();

    assert!(matches!(err, GateError::Tree(TreeError::Codec(_))));
    assert_eq!(session.root().unwrap(), &before);
}

#[test]
fn test_out_of_range_index_is_rejected() {
    let registry = common::codecs();
    let components = common::components();
    let gate = TransactionGate::new(&components, &registry);
    let mut session = common::sample_session();
    let before = session.root().unwrap().clone();

    for x in ["18446744073709551615", "100000000"] {
        let message = ClientMessage::parse(&format!(
            r#"<cmsg i="0"><p i="c_3" n="text">kept out</p><p i="c_3" n="history" x="{}">b</p></cmsg>"#,
            x
        ))
        .unwrap();
        let err = gate.process(&mut session, &message).unwrap_err();
        assert!(matches!(err, GateError::Tree(TreeError::InvalidIndex(ref text)) if text == x));
        assert_eq!(session.root().unwrap(), &before);
    }
}

#[test]
fn test_index_limit_is_configurable() {
    let registry = common::codecs();
    let components = common::components();
    let gate = TransactionGate::new(&components, &registry).with_max_property_index(2);
    let mut session = common::sample_session();

    let within = ClientMessage::parse(r#"<cmsg i="0"><p i="c_3" n="history" x="2">z</p></cmsg>"#)
        .unwrap();
    assert!(gate.process(&mut session, &within).is_ok());

    let beyond = ClientMessage::parse(r#"<cmsg i="0"><p i="c_3" n="history" x="3">z</p></cmsg>"#)
        .unwrap();
    assert!(matches!(
        gate.process(&mut session, &beyond),
        Err(GateError::Tree(TreeError::InvalidIndex(_)))
    ));
}

#[test]
fn test_deeply_nested_client_message_is_rejected() {
    let levels = 200_000;
    let mut xml = String::from(r#"<cmsg i="0">"#);
    xml.push_str(&r#"<p i="c_3" n="a" t="Map">"#.repeat(levels));
    xml.push_str(&"</p>".repeat(levels));
    xml.push_str("</cmsg>");

    let err = ClientMessage::parse(&xml).unwrap_err();
    assert!(matches!(
        err,
        GateError::Wire(WireError::TooDeep { limit }) if limit == DEFAULT_MAX_DEPTH
    ));
}

#[test]
fn test_malformed_client_id_is_rejected() {
    let registry = common::codecs();
    let components = common::components();
    let gate = TransactionGate::new(&components, &registry);
    let mut session = common::sample_session();

    let message = ClientMessage::new(0).with_property("3", common::text_property("x"));
    let err = gate.process(&mut session, &message).unwrap_err();
    assert!(matches!(err, GateError::Session(_)));
}

#[test]
fn test_unobserved_event_is_not_fired() {
    let registry = common::codecs();
    let components = common::components();
    let gate = TransactionGate::new(&components, &registry);
    let mut session = common::sample_session();

    let message = ClientMessage::new(0).with_event("c_2", "action");
    let outcome = gate.process(&mut session, &message).unwrap();
    assert_eq!(
        outcome,
        GateOutcome::Applied {
            properties: 0,
            events: vec![],
        }
    );
}

/// A kind that only takes input while its `readOnly` property is unset.
struct ReadOnlyAware;

impl ComponentKind for ReadOnlyAware {
    fn type_name(&self) -> &str {
        "TextField"
    }

    fn accepts_input(&self, node: &ComponentNode) -> bool {
        node.enabled && node.properties.get("readOnly").and_then(PropertyValue::as_bool) != Some(true)
    }
}

#[test]
fn test_kind_can_refuse_input() {
    let registry = common::codecs();
    let mut components = ComponentRegistry::new().with_basic(&["Window", "Column", "Label", "Button"]);
    components.register(Arc::new(ReadOnlyAware));
    let gate = TransactionGate::new(&components, &registry);
    let mut session = common::sample_session();
    session
        .root_mut()
        .unwrap()
        .find_mut("3")
        .unwrap()
        .properties
        .set("readOnly", PropertyValue::from(true));

    let message = ClientMessage::new(0).with_property("c_3", common::text_property("typed"));
    let outcome = gate.process(&mut session, &message).unwrap();

    assert!(matches!(outcome, GateOutcome::Applied { properties: 0, .. }));
    let field = session.root().unwrap().find("3").unwrap();
    assert_eq!(field.properties.get("text"), Some(&PropertyValue::from("")));
}
