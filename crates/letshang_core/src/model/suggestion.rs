//! Suggestion records attached to a hang.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SuggestionId = Uuid;

/// What a suggestion proposes to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    Time,
    Location,
    #[default]
    General,
}

impl SuggestionCategory {
    pub const ALL: [SuggestionCategory; 3] = [Self::Time, Self::Location, Self::General];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Location => "location",
            Self::General => "general",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "time" => Some(Self::Time),
            "location" => Some(Self::Location),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

/// Direction of a single vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Free-text proposal with a signed vote tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: SuggestionId,
    /// Trimmed, never empty.
    pub content: String,
    pub category: SuggestionCategory,
    pub votes: i64,
    /// Display name of whoever proposed it, when the store knows.
    #[serde(default)]
    pub author: Option<String>,
}

impl Suggestion {
    /// Creates a suggestion with zero votes.
    ///
    /// Returns `None` when `content` is empty after trimming.
    pub fn new(category: SuggestionCategory, content: &str) -> Option<Self> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            content: content.to_string(),
            category,
            votes: 0,
            author: None,
        })
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Suggestion, SuggestionCategory, VoteDirection};

    #[test]
    fn blank_content_is_rejected() {
        assert!(Suggestion::new(SuggestionCategory::General, "   \n").is_none());
    }

    #[test]
    fn content_is_trimmed_and_starts_unvoted() {
        let suggestion = Suggestion::new(SuggestionCategory::Time, "  6pm? ").unwrap();
        assert_eq!(suggestion.content, "6pm?");
        assert_eq!(suggestion.votes, 0);
        assert_eq!(suggestion.author, None);
    }

    #[test]
    fn blank_author_is_dropped() {
        let suggestion = Suggestion::new(SuggestionCategory::Location, "park")
            .unwrap()
            .with_author(Some("  ".to_string()));
        assert_eq!(suggestion.author, None);
    }

    #[test]
    fn vote_deltas_are_unit_steps() {
        assert_eq!(VoteDirection::Up.delta(), 1);
        assert_eq!(VoteDirection::Down.delta(), -1);
    }
}
