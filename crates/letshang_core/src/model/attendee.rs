//! Attendee records and RSVP status.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AttendeeId = Uuid;

/// Attendance intent of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsvpStatus {
    #[serde(rename = "going")]
    Going,
    #[serde(rename = "maybe")]
    Maybe,
    #[serde(rename = "not-going")]
    NotGoing,
}

impl RsvpStatus {
    pub const ALL: [RsvpStatus; 3] = [Self::Going, Self::Maybe, Self::NotGoing];

    /// Stable wire label, shared by storage and FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Maybe => "maybe",
            Self::NotGoing => "not-going",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "going" => Some(Self::Going),
            "maybe" => Some(Self::Maybe),
            "not-going" | "not_going" => Some(Self::NotGoing),
            _ => None,
        }
    }
}

/// One participant of a hang.
///
/// Holds exactly one status; setting a new one overwrites the old value and
/// no history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: AttendeeId,
    pub name: String,
    pub status: RsvpStatus,
}

impl Attendee {
    pub fn new(name: impl Into<String>, status: RsvpStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status,
        }
    }

    /// Case-insensitive display-name match used by RSVP upserts.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::{Attendee, RsvpStatus};

    #[test]
    fn status_labels_roundtrip() {
        for status in RsvpStatus::ALL {
            assert_eq!(RsvpStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RsvpStatus::parse("yes"), None);
    }

    #[test]
    fn status_serializes_with_wire_labels() {
        let json = serde_json::to_string(&RsvpStatus::NotGoing).unwrap();
        assert_eq!(json, "\"not-going\"");
    }

    #[test]
    fn name_match_ignores_case_and_padding() {
        let attendee = Attendee::new("Sam", RsvpStatus::Maybe);
        assert!(attendee.is_named(" sam "));
        assert!(!attendee.is_named("samantha"));
    }
}
