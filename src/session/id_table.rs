//! Short opaque ids for in-session objects, held weakly.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

type Entry = Weak<dyn Any + Send + Sync>;

/// Id → object table. Entries do not keep their object alive; dead entries
/// linger until [`IdTable::purge`].
#[derive(Default)]
pub struct IdTable {
    next_id: u64,
    entries: HashMap<String, Entry>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `object`, assigning a fresh one on first registration.
    pub fn register<T>(&mut self, object: &Arc<T>) -> String
    where
        T: Any + Send + Sync,
    {
        let target = Arc::as_ptr(object) as *const ();
        if let Some(id) = self
            .entries
            .iter()
            .find(|(_, weak)| weak.as_ptr() as *const () == target && weak.strong_count() > 0)
            .map(|(id, _)| id.clone())
        {
            return id;
        }

        self.next_id += 1;
        let id = self.next_id.to_string();
        let shared: Arc<dyn Any + Send + Sync> = object.clone();
        self.entries.insert(id.clone(), Arc::downgrade(&shared));
        id
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(id).and_then(Weak::upgrade)
    }

    pub fn get_as<T>(&self, id: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.get(id).and_then(|object| object.downcast::<T>().ok())
    }

    /// Drop entries whose object is gone. Returns how many went.
    pub fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for IdTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTable")
            .field("next_id", &self.next_id)
            .field("entries", &self.entries.len())
            .finish()
    }
}
