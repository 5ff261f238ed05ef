use std::collections::BTreeMap;

use crate::property::PropertyValue;

/// A stored property: a single value or an indexed sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEntry {
    Value(PropertyValue),
    Indexed(Vec<PropertyValue>),
}

/// Name → property storage shared by component nodes and style records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: BTreeMap<String, PropertyEntry>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: PropertyValue) {
        self.entries
            .insert(name.to_string(), PropertyEntry::Value(value));
    }

    /// Write one element of an indexed property.
    ///
    /// The backing sequence grows as needed; gaps are filled with `Null`.
    /// A previously single-valued property is replaced by a sequence. An
    /// index with no representable length is ignored.
    pub fn set_indexed(&mut self, name: &str, index: usize, value: PropertyValue) {
        let Some(len) = index.checked_add(1) else {
            tracing::warn!(property = %name, index, "Indexed write out of range, ignoring");
            return;
        };
        let entry = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| PropertyEntry::Indexed(Vec::new()));
        if let PropertyEntry::Value(_) = entry {
            *entry = PropertyEntry::Indexed(Vec::new());
        }
        if let PropertyEntry::Indexed(values) = entry {
            if values.len() <= index {
                values.resize(len, PropertyValue::Null);
            }
            values[index] = value;
        }
    }

    /// Single value of a property; `None` for absent or indexed properties.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        match self.entries.get(name)? {
            PropertyEntry::Value(value) => Some(value),
            PropertyEntry::Indexed(_) => None,
        }
    }

    pub fn get_indexed(&self, name: &str, index: usize) -> Option<&PropertyValue> {
        match self.entries.get(name)? {
            PropertyEntry::Indexed(values) => values.get(index),
            PropertyEntry::Value(_) => None,
        }
    }

    pub fn entry(&self, name: &str) -> Option<&PropertyEntry> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyEntry> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_indexed_write_fills_gaps_with_null() {
        let mut bag = PropertyBag::new();
        bag.set_indexed("columns", 3, PropertyValue::from("d"));

        assert_eq!(bag.get_indexed("columns", 0), Some(&PropertyValue::Null));
        assert_eq!(bag.get_indexed("columns", 3), Some(&PropertyValue::from("d")));
        assert_eq!(bag.get_indexed("columns", 4), None);

        bag.set_indexed("columns", 1, PropertyValue::from("b"));
        match bag.entry("columns") {
            Some(PropertyEntry::Indexed(values)) => assert_eq!(values.len(), 4),
            other => panic!("expected indexed entry, got {:?}", other),
        }
    }

    #[test]
    fn indexed_write_replaces_single_value() {
        let mut bag = PropertyBag::new();
        bag.set("widths", PropertyValue::from(5));
        bag.set_indexed("widths", 0, PropertyValue::from(7));

        assert_eq!(bag.get("widths"), None);
        assert_eq!(bag.get_indexed("widths", 0), Some(&PropertyValue::from(7)));
    }

    #[test]
    fn unrepresentable_index_is_ignored() {
        let mut bag = PropertyBag::new();
        bag.set_indexed("rows", 1, PropertyValue::from("b"));
        bag.set_indexed("rows", usize::MAX, PropertyValue::from("z"));
        bag.set_indexed("other", usize::MAX, PropertyValue::from("z"));

        match bag.entry("rows") {
            Some(PropertyEntry::Indexed(values)) => assert_eq!(values.len(), 2),
            other => panic!("expected indexed entry, got {:?}", other),
        }
        assert!(!bag.contains("other"));
    }
}
