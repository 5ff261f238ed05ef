use std::collections::BTreeSet;

use crate::property::{PropertyBag, PropertyValue};

/// A server-tracked UI element. Children are owned exclusively by their
/// parent; a node goes away only when removed from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    /// Type tag selecting the component kind.
    pub kind: String,
    /// Id, unique within the tree.
    pub id: String,
    pub enabled: bool,
    pub style_name: Option<String>,
    pub properties: PropertyBag,
    /// Event kinds the client should report for this node.
    pub events: BTreeSet<String>,
    pub children: Vec<ComponentNode>,
}

impl ComponentNode {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            enabled: true,
            style_name: None,
            properties: PropertyBag::new(),
            events: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.set(name, value.into());
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.events.insert(event.into());
        self
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn observes(&self, event: &str) -> bool {
        self.events.contains(event)
    }

    /// Depth-first search including `self`.
    pub fn find(&self, id: &str) -> Option<&ComponentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ComponentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Detach a descendant (never `self`) and hand it back.
    pub fn remove_child(&mut self, id: &str) -> Option<ComponentNode> {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            return Some(self.children.remove(pos));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.remove_child(id))
    }

    /// Visit `self` and every descendant in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ComponentNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ComponentNode {
        ComponentNode::new("Window", "root")
            .with_child(
                ComponentNode::new("Column", "col")
                    .with_child(ComponentNode::new("Label", "l1"))
                    .with_child(ComponentNode::new("Button", "b1")),
            )
            .with_child(ComponentNode::new("Label", "l2"))
    }

    #[test]
    fn find_reaches_nested_nodes() {
        let mut root = sample();
        assert_eq!(root.find("b1").map(|n| n.kind.as_str()), Some("Button"));
        assert!(root.find("missing").is_none());

        root.find_mut("l1").unwrap().enabled = false;
        assert!(!root.find("l1").unwrap().enabled);
    }

    #[test]
    fn remove_child_detaches_whole_subtree() {
        let mut root = sample();
        let column = root.remove_child("col").expect("column");
        assert_eq!(column.children.len(), 2);
        assert!(root.find("l1").is_none());
        assert!(root.remove_child("root").is_none());
    }

    #[test]
    fn walk_visits_in_document_order() {
        let root = sample();
        let mut ids = Vec::new();
        root.walk(&mut |node| ids.push(node.id.as_str()));
        assert_eq!(ids, ["root", "col", "l1", "b1", "l2"]);
    }
}
