//! Session-local single-shot vote lock.
//!
//! # Invariants
//! - A suggestion recorded here is never voted again through the same
//!   session.
//! - The lock lives only in memory. A new session (page reload, new process)
//!   starts empty, and the store itself does not enforce anything, so this
//!   is a UX guard rather than a guarantee.

use crate::model::suggestion::SuggestionId;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct VoteSession {
    voted: HashSet<SuggestionId>,
}

impl VoteSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, suggestion_id: SuggestionId) -> bool {
        self.voted.contains(&suggestion_id)
    }

    /// Locks a suggestion for this session.
    ///
    /// Returns `false` when it was already locked.
    pub fn record(&mut self, suggestion_id: SuggestionId) -> bool {
        self.voted.insert(suggestion_id)
    }

    pub fn voted_count(&self) -> usize {
        self.voted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::VoteSession;
    use uuid::Uuid;

    #[test]
    fn record_is_single_shot() {
        let mut session = VoteSession::new();
        let id = Uuid::new_v4();
        assert!(!session.has_voted(id));
        assert!(session.record(id));
        assert!(!session.record(id));
        assert!(session.has_voted(id));
        assert_eq!(session.voted_count(), 1);
    }
}
