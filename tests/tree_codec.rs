mod common;

use uisync::codec::{CodecError, ReferenceTable};
use uisync::property::{Extent, Insets, PropertyValue};
use uisync::tree::{self, ComponentNode, ComponentRegistry, TreeDecoder, TreeError};
use uisync::wire::Element;

#[test]
fn test_tree_round_trip_through_xml() {
    let registry = common::codecs();
    let components = common::components();
    let original = common::sample_tree();

    let xml = tree::encode(&original, &registry)
        .unwrap()
        .to_xml_string()
        .unwrap();
    let document = Element::parse(&xml).unwrap();
    let decoded = tree::decode(&document, &components, &registry, None).unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn test_decoding_twice_gives_equal_trees() {
    let registry = common::codecs();
    let components = common::components();
    let document = tree::encode(&common::sample_tree(), &registry).unwrap();

    let first = tree::decode(&document, &components, &registry, None).unwrap();
    let second = tree::decode(&document, &components, &registry, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sparse_sequence_keeps_positions() {
    let registry = common::codecs();
    let components = common::components();
    let document = tree::encode(&common::sample_tree(), &registry).unwrap();
    let decoded = tree::decode(&document, &components, &registry, None).unwrap();

    let field = decoded.find("3").unwrap();
    assert_eq!(field.properties.get_indexed("history", 0), Some(&PropertyValue::from("a")));
    assert_eq!(field.properties.get_indexed("history", 1), Some(&PropertyValue::Null));
    assert_eq!(field.properties.get_indexed("history", 2), Some(&PropertyValue::from("c")));
}

#[test]
fn test_document_order_of_encoded_children() {
    let registry = common::codecs();
    let button = tree::encode(&common::sample_tree(), &registry)
        .unwrap()
        .children()[0]
        .children()[2]
        .clone();

    let names: Vec<_> = button.children().iter().map(Element::name).collect();
    assert_eq!(names, vec!["p", "p", "e"]);
    assert_eq!(button.attr("i"), Some("4"));
}

#[test]
fn test_unknown_component_type_fails_whole_decode() {
    let registry = common::codecs();
    let components = common::components();
    let document = Element::parse(
        r#"<c t="Window" i="0"><c t="Column" i="1"><c t="Gauge" i="9"/></c></c>"#,
    )
    .unwrap();

    let err = tree::decode(&document, &components, &registry, None).unwrap_err();
    assert!(matches!(err, TreeError::UnknownComponentType(ref t) if t == "Gauge"));
}

#[test]
fn test_lenient_registry_accepts_unknown_types() {
    let registry = common::codecs();
    let components = ComponentRegistry::new().accept_unknown_types(true);
    let document =
        Element::parse(r#"<c t="Gauge" i="9"><p n="value" t="n">0.5</p></c>"#).unwrap();

    let node = tree::decode(&document, &components, &registry, None).unwrap();
    assert_eq!(node.kind, "Gauge");
    assert_eq!(node.properties.get("value"), Some(&PropertyValue::Float(0.5)));
}

#[test]
fn test_missing_id_is_fatal() {
    let registry = common::codecs();
    let components = common::components();
    let document = Element::parse(r#"<c t="Label"/>"#).unwrap();

    let err = tree::decode(&document, &components, &registry, None).unwrap_err();
    assert!(matches!(err, TreeError::MissingAttribute { attribute: "i", .. }));
}

#[test]
fn test_references_shared_across_components() {
    let registry = common::codecs();
    let components = common::components();
    let padding = PropertyValue::Insets(Insets::uniform(Extent::px(8.0)));
    let mut references = ReferenceTable::new();
    references.insert("pad", padding.clone());

    let root = ComponentNode::new("Column", "1")
        .with_child(ComponentNode::new("Label", "2").with_property("insets", padding.clone()))
        .with_child(ComponentNode::new("Label", "3").with_property("insets", padding.clone()));

    let document = tree::TreeEncoder::new(&registry)
        .with_references(&references)
        .encode_component(&root)
        .unwrap();
    assert_eq!(document.children()[0].children()[0].attr("r"), Some("pad"));

    let decoded = tree::decode(&document, &components, &registry, Some(&references)).unwrap();
    assert_eq!(decoded, root);
}

#[test]
fn test_codec_failure_surfaces_through_tree_error() {
    let registry = common::codecs();
    let components = common::components();
    let document =
        Element::parse(r#"<c t="Label" i="2"><p n="size" t="Extent">wide</p></c>"#).unwrap();

    let err = TreeDecoder::new(&components, &registry)
        .decode_component(&document)
        .unwrap_err();
    assert!(matches!(err, TreeError::Codec(CodecError::InvalidValue { .. })));
}
