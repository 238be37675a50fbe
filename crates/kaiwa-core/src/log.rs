//! Session message log.
//!
//! Appended to by the connection's receive task, read by the render loop;
//! the mutex is the boundary between those two contexts. Entries are
//! append-only, in delivery order, and kept for the whole session — there
//! is no eviction.

use crate::RelayMessage;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle to the session's append-only message log.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Arc<Mutex<Vec<RelayMessage>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delivered message.
    pub fn push(&self, message: RelayMessage) {
        self.lock().push(message);
    }

    /// Clone the current contents for rendering.
    pub fn snapshot(&self) -> Vec<RelayMessage> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Append-only contents stay well-formed across a poisoned lock.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RelayMessage>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_delivery_order() {
        let log = MessageLog::new();
        let delivered = [
            RelayMessage::new("user1", "첫번째"),
            RelayMessage::new("user2", "二番目"),
            RelayMessage::new("user1", "세번째"),
        ];
        for message in &delivered {
            log.push(message.clone());
        }
        assert_eq!(log.snapshot(), delivered);
    }

    #[test]
    fn appends_from_another_thread_are_visible() {
        let log = MessageLog::new();
        let writer = log.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..10 {
                writer.push(RelayMessage::new("user2", format!("msg {i}")));
            }
        });
        handle.join().unwrap();
        assert_eq!(log.len(), 10);
        assert_eq!(log.snapshot()[9].content, "msg 9");
    }

    #[test]
    fn starts_empty() {
        let log = MessageLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }
}
