//! Shared test fixtures.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;

use tempfile::TempDir;
use uisync::codec::CodecRegistry;
use uisync::config::SessionConfig;
use uisync::property::{Color, Extent, Font, PropertyValue, Typeface};
use uisync::session::{Application, RequestParameters, SessionContext, TreeApplication};
use uisync::tree::{ComponentNode, ComponentRegistry};
use uisync::wire::Element;

pub const COMPONENT_TYPES: &[&str] = &["Window", "Column", "Label", "TextField", "Button"];

/// Registry with every built-in codec.
pub fn codecs() -> CodecRegistry {
    CodecRegistry::with_builtins()
}

/// Component registry knowing [`COMPONENT_TYPES`].
pub fn components() -> ComponentRegistry {
    ComponentRegistry::new().with_basic(COMPONENT_TYPES)
}

/// A small window: a column holding a styled label, a text field and a
/// button observing `action`.
pub fn sample_tree() -> ComponentNode {
    let font = Font {
        typeface: Some(Typeface::Chain(vec!["Verdana".into(), "sans-serif".into()])),
        size: Some("10pt".parse().unwrap()),
        bold: true,
        ..Font::default()
    };

    let mut label = ComponentNode::new("Label", "2")
        .with_property("text", "Name")
        .with_property("font", PropertyValue::Font(font))
        .with_property("foreground", PropertyValue::Color(Color::rgb(0x33, 0x66, 0x99)));
    label.style_name = Some("Caption".to_string());

    let mut field = ComponentNode::new("TextField", "3")
        .with_property("text", "")
        .with_property("width", PropertyValue::Extent(Extent::px(120.0)))
        .with_property("maxLength", 40);
    field.properties.set_indexed("history", 0, PropertyValue::from("a"));
    field.properties.set_indexed("history", 2, PropertyValue::from("c"));

    let button = ComponentNode::new("Button", "4")
        .with_property("text", "OK")
        .with_property("default", true)
        .with_event("action");

    ComponentNode::new("Window", "0").with_child(
        ComponentNode::new("Column", "1")
            .with_child(label)
            .with_child(field)
            .with_child(button),
    )
}

/// Initialized session running [`sample_tree`].
pub fn sample_session() -> SessionContext {
    let mut session = SessionContext::new(&SessionConfig::default(), RequestParameters::new());
    let factory = |_: &RequestParameters| -> Box<dyn Application> {
        Box::new(TreeApplication::new(sample_tree()))
    };
    session.init(&factory).expect("init sample session");
    session
}

/// Property element for a client update.
pub fn text_property(value: &str) -> Element {
    Element::new("p").with_attr("n", "text").with_text(value)
}

/// Write `content` to a config file in a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
