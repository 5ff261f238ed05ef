use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Session-level properties changed since the last server message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdateManager {
    pending: BTreeSet<String>,
}

impl SessionUpdateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_property_update(&mut self, name: &str) {
        self.pending.insert(name.to_string());
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.contains(name)
    }

    pub fn has_updates(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain pending names in name order.
    pub fn take_updates(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}
