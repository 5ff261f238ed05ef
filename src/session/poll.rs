//! Poll-interval votes of task queues.
//!
//! Votes are held weakly: once every clone of a [`TaskQueueHandle`] is gone
//! its vote stops counting and the next [`PollIntervals::purge`] drops it.
//! A handle that is kept alive by mistake keeps voting.

use std::sync::{Arc, Weak};

use uuid::Uuid;

#[derive(Debug)]
struct QueueToken {
    id: Uuid,
}

/// Identity of an application task queue.
#[derive(Debug, Clone)]
pub struct TaskQueueHandle {
    token: Arc<QueueToken>,
}

impl TaskQueueHandle {
    pub fn new() -> Self {
        Self {
            token: Arc::new(QueueToken { id: Uuid::new_v4() }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.token.id
    }

    fn is(&self, weak: &Weak<QueueToken>) -> bool {
        std::ptr::eq(weak.as_ptr(), Arc::as_ptr(&self.token))
    }
}

impl Default for TaskQueueHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TaskQueueHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }
}

impl Eq for TaskQueueHandle {}

/// Interval votes, resolved to their minimum.
#[derive(Debug)]
pub struct PollIntervals {
    votes: Vec<(Weak<QueueToken>, u64)>,
    default_ms: u64,
}

impl PollIntervals {
    pub fn new(default_ms: u64) -> Self {
        Self {
            votes: Vec::new(),
            default_ms,
        }
    }

    /// Record or replace the vote of `queue`.
    pub fn set(&mut self, queue: &TaskQueueHandle, interval_ms: u64) {
        self.purge();
        match self.votes.iter_mut().find(|(weak, _)| queue.is(weak)) {
            Some(vote) => vote.1 = interval_ms,
            None => self
                .votes
                .push((Arc::downgrade(&queue.token), interval_ms)),
        }
    }

    pub fn remove(&mut self, queue: &TaskQueueHandle) -> bool {
        let before = self.votes.len();
        self.votes.retain(|(weak, _)| !queue.is(weak));
        before != self.votes.len()
    }

    /// Smallest live vote, or the default when nobody votes.
    pub fn resolve(&self) -> u64 {
        self.votes
            .iter()
            .filter(|(weak, _)| weak.strong_count() > 0)
            .map(|(_, ms)| *ms)
            .min()
            .unwrap_or(self.default_ms)
    }

    /// Drop votes of queues that no longer exist. Returns how many went.
    pub fn purge(&mut self) -> usize {
        let before = self.votes.len();
        self.votes.retain(|(weak, _)| weak.strong_count() > 0);
        let purged = before - self.votes.len();
        if purged > 0 {
            tracing::debug!(purged, "Purged poll votes of dropped task queues");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn default_ms(&self) -> u64 {
        self.default_ms
    }
}
