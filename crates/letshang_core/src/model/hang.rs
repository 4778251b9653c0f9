//! Hang domain model.
//!
//! # Responsibility
//! - Define the canonical gathering record and its child collections.
//! - Provide field-level mutation helpers shared by every store.
//!
//! # Invariants
//! - `code` is stable and never reassigned.
//! - `max_attendees` is informational; the going count may exceed it.
//! - `date` is `YYYY-MM-DD` and `time` is `HH:MM`, so lexical order equals
//!   chronological order.

use crate::code::ShareCode;
use crate::model::attendee::{Attendee, AttendeeId, RsvpStatus};
use crate::model::suggestion::{Suggestion, SuggestionId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Capacity applied when the create form leaves it blank or non-numeric.
pub const DEFAULT_MAX_ATTENDEES: u32 = 10;

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid date regex"));
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"));

/// Planned gathering addressed by its share code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hang {
    pub code: ShareCode,
    pub title: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`, 24-hour clock.
    pub time: String,
    pub location: String,
    pub description: Option<String>,
    pub max_attendees: u32,
    pub attendees: Vec<Attendee>,
    pub suggestions: Vec<Suggestion>,
    /// Display name of the creator. Grants no extra privileges.
    pub host: String,
}

/// Validation error for hang invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HangValidationError {
    /// A required text field is empty after trimming.
    MissingField(&'static str),
    InvalidDate(String),
    InvalidTime(String),
    InvalidCapacity(u32),
    EmptySuggestion(SuggestionId),
}

impl Display for HangValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::InvalidDate(value) => write!(f, "date must be YYYY-MM-DD, got `{value}`"),
            Self::InvalidTime(value) => write!(f, "time must be HH:MM, got `{value}`"),
            Self::InvalidCapacity(value) => {
                write!(f, "max_attendees must be positive, got {value}")
            }
            Self::EmptySuggestion(id) => write!(f, "suggestion {id} has empty content"),
        }
    }
}

impl Error for HangValidationError {}

impl Hang {
    /// Validates field invariants required by every store.
    ///
    /// # Errors
    /// - `MissingField` when title, date, time, location or host is blank.
    /// - `InvalidDate` when the date is not `YYYY-MM-DD` or names a day the
    ///   month does not have (`2024-02-31`).
    /// - `InvalidTime` when the time is not 24-hour `HH:MM`.
    /// - `InvalidCapacity` when `max_attendees == 0`.
    /// - `EmptySuggestion` when any suggestion content is blank.
    pub fn validate(&self) -> Result<(), HangValidationError> {
        for (field, value) in [
            ("title", &self.title),
            ("date", &self.date),
            ("time", &self.time),
            ("location", &self.location),
            ("host", &self.host),
        ] {
            if value.trim().is_empty() {
                return Err(HangValidationError::MissingField(field));
            }
        }
        if !is_calendar_date(&self.date) {
            return Err(HangValidationError::InvalidDate(self.date.clone()));
        }
        if !TIME_RE.is_match(&self.time) {
            return Err(HangValidationError::InvalidTime(self.time.clone()));
        }
        if self.max_attendees == 0 {
            return Err(HangValidationError::InvalidCapacity(self.max_attendees));
        }
        if let Some(bad) = self
            .suggestions
            .iter()
            .find(|suggestion| suggestion.content.trim().is_empty())
        {
            return Err(HangValidationError::EmptySuggestion(bad.id));
        }
        Ok(())
    }

    /// Number of attendees currently marked going.
    pub fn going_count(&self) -> usize {
        self.count_with(RsvpStatus::Going)
    }

    pub fn count_with(&self, status: RsvpStatus) -> usize {
        self.attendees
            .iter()
            .filter(|attendee| attendee.status == status)
            .count()
    }

    /// Headcount label shown on hang cards, e.g. `3 of 10`.
    pub fn headcount_label(&self) -> String {
        format!("{} of {}", self.going_count(), self.max_attendees)
    }

    /// Whether the hang is scheduled strictly before `today` (`YYYY-MM-DD`).
    pub fn is_past(&self, today: &str) -> bool {
        self.date.as_str() < today
    }

    pub fn attendee(&self, id: AttendeeId) -> Option<&Attendee> {
        self.attendees.iter().find(|attendee| attendee.id == id)
    }

    pub fn suggestion(&self, id: SuggestionId) -> Option<&Suggestion> {
        self.suggestions.iter().find(|suggestion| suggestion.id == id)
    }

    /// Overwrites one attendee's status.
    ///
    /// Returns `false` and leaves the hang untouched when `id` is unknown.
    pub fn set_status(&mut self, id: AttendeeId, status: RsvpStatus) -> bool {
        match self.attendees.iter_mut().find(|attendee| attendee.id == id) {
            Some(attendee) => {
                attendee.status = status;
                true
            }
            None => false,
        }
    }

    /// Updates the attendee with a matching display name, or appends one.
    ///
    /// Returns the affected attendee ID.
    pub fn upsert_rsvp(&mut self, name: &str, status: RsvpStatus) -> AttendeeId {
        if let Some(attendee) = self
            .attendees
            .iter_mut()
            .find(|attendee| attendee.is_named(name))
        {
            attendee.status = status;
            return attendee.id;
        }
        let attendee = Attendee::new(name.trim(), status);
        let id = attendee.id;
        self.attendees.push(attendee);
        id
    }

    /// Adds `delta` to a suggestion's votes, returning the new tally.
    pub fn apply_vote(&mut self, id: SuggestionId, delta: i64) -> Option<i64> {
        let suggestion = self
            .suggestions
            .iter_mut()
            .find(|suggestion| suggestion.id == id)?;
        suggestion.votes += delta;
        Some(suggestion.votes)
    }

    /// Removes one suggestion, keeping the order of the rest.
    pub fn remove_suggestion(&mut self, id: SuggestionId) -> Option<Suggestion> {
        let index = self
            .suggestions
            .iter()
            .position(|suggestion| suggestion.id == id)?;
        Some(self.suggestions.remove(index))
    }
}

/// Raw create-form input.
///
/// Fields mirror what the form submits; `max_attendees` stays textual so the
/// default-on-garbage rule lives in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewHang {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: Option<String>,
    pub max_attendees: Option<String>,
}

impl NewHang {
    /// Builds the hang record with the creator seeded as going.
    ///
    /// # Invariants
    /// - Text fields are trimmed; a blank description becomes `None`.
    /// - Capacity falls back to `DEFAULT_MAX_ATTENDEES` when absent,
    ///   non-numeric or not positive.
    /// - This does not validate; stores call `Hang::validate()`.
    pub fn into_hang(self, code: ShareCode, host: &str) -> Hang {
        let host = host.trim().to_string();
        Hang {
            code,
            title: self.title.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            location: self.location.trim().to_string(),
            description: self
                .description
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            max_attendees: parse_max_attendees(self.max_attendees.as_deref()),
            attendees: vec![Attendee::new(host.clone(), RsvpStatus::Going)],
            suggestions: Vec::new(),
            host,
        }
    }
}

/// Parses the capacity field like the create form does.
///
/// Only the leading digits count (`"12.5"` is 12, `"8 people"` is 8);
/// no digits, zero or overflow fall back to `DEFAULT_MAX_ATTENDEES`.
pub fn parse_max_attendees(raw: Option<&str>) -> u32 {
    raw.map(str::trim_start)
        .map(|value| value.strip_prefix('+').unwrap_or(value))
        .and_then(|value| {
            let end = value
                .find(|ch: char| !ch.is_ascii_digit())
                .unwrap_or(value.len());
            value[..end].parse::<u32>().ok()
        })
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_ATTENDEES)
}

fn is_calendar_date(value: &str) -> bool {
    let Some(caps) = DATE_RE.captures(value) else {
        return false;
    };
    let field = |index: usize| caps[index].parse::<u32>().unwrap_or(0);
    let (year, month, day) = (field(1), field(2), field(3));
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days_in_month).contains(&day)
}

#[cfg(test)]
mod tests {
    use super::{parse_max_attendees, HangValidationError, NewHang, DEFAULT_MAX_ATTENDEES};
    use crate::code::ShareCode;
    use crate::model::attendee::RsvpStatus;

    fn game_night() -> NewHang {
        NewHang {
            title: "Game Night".to_string(),
            date: "2024-01-15".to_string(),
            time: "19:00".to_string(),
            location: "My place".to_string(),
            ..NewHang::default()
        }
    }

    #[test]
    fn capacity_defaults_on_missing_or_garbage_input() {
        assert_eq!(parse_max_attendees(None), DEFAULT_MAX_ATTENDEES);
        assert_eq!(parse_max_attendees(Some("lots")), DEFAULT_MAX_ATTENDEES);
        assert_eq!(parse_max_attendees(Some("0")), DEFAULT_MAX_ATTENDEES);
        assert_eq!(parse_max_attendees(Some(" 4 ")), 4);
        assert_eq!(parse_max_attendees(Some("-3")), DEFAULT_MAX_ATTENDEES);
    }

    #[test]
    fn capacity_keeps_leading_digits() {
        assert_eq!(parse_max_attendees(Some("12.5")), 12);
        assert_eq!(parse_max_attendees(Some("8 people")), 8);
        assert_eq!(parse_max_attendees(Some("+6")), 6);
        assert_eq!(parse_max_attendees(Some("99999999999")), DEFAULT_MAX_ATTENDEES);
    }

    #[test]
    fn validate_rejects_days_the_month_lacks() {
        let mut hang = game_night().into_hang(ShareCode::generate(), "Alex");
        for bad in ["2024-02-31", "2023-02-29", "2024-04-31", "2024-13-01", "2024-00-10"] {
            hang.date = bad.to_string();
            assert!(
                matches!(hang.validate(), Err(HangValidationError::InvalidDate(_))),
                "{bad}"
            );
        }
        for good in ["2024-02-29", "2000-02-29", "2024-12-31"] {
            hang.date = good.to_string();
            hang.validate().unwrap();
        }
    }

    #[test]
    fn into_hang_seeds_host_as_going() {
        let hang = game_night().into_hang(ShareCode::generate(), "Alex");
        assert_eq!(hang.attendees.len(), 1);
        assert_eq!(hang.attendees[0].name, "Alex");
        assert_eq!(hang.attendees[0].status, RsvpStatus::Going);
        assert_eq!(hang.max_attendees, 10);
        assert_eq!(hang.description, None);
        hang.validate().unwrap();
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut input = game_night();
        input.location = "  ".to_string();
        let hang = input.into_hang(ShareCode::generate(), "Alex");
        assert_eq!(
            hang.validate().unwrap_err(),
            HangValidationError::MissingField("location")
        );
    }

    #[test]
    fn validate_rejects_malformed_date_and_time() {
        let mut hang = game_night().into_hang(ShareCode::generate(), "Alex");
        hang.date = "15/01/2024".to_string();
        assert!(matches!(
            hang.validate(),
            Err(HangValidationError::InvalidDate(_))
        ));

        hang.date = "2024-01-15".to_string();
        hang.time = "7pm".to_string();
        assert!(matches!(
            hang.validate(),
            Err(HangValidationError::InvalidTime(_))
        ));
    }

    #[test]
    fn going_count_is_not_capped_by_capacity() {
        let mut input = game_night();
        input.max_attendees = Some("1".to_string());
        let mut hang = input.into_hang(ShareCode::generate(), "Alex");
        hang.upsert_rsvp("Bo", RsvpStatus::Going);
        hang.upsert_rsvp("Cy", RsvpStatus::Maybe);
        assert_eq!(hang.going_count(), 2);
        assert_eq!(hang.headcount_label(), "2 of 1");
        hang.validate().unwrap();
    }

    #[test]
    fn upsert_rsvp_reuses_matching_name() {
        let mut hang = game_night().into_hang(ShareCode::generate(), "Alex");
        let host_id = hang.attendees[0].id;
        let id = hang.upsert_rsvp("alex", RsvpStatus::NotGoing);
        assert_eq!(id, host_id);
        assert_eq!(hang.attendees.len(), 1);
        assert_eq!(hang.attendees[0].status, RsvpStatus::NotGoing);
    }

    #[test]
    fn is_past_compares_calendar_dates() {
        let hang = game_night().into_hang(ShareCode::generate(), "Alex");
        assert!(hang.is_past("2024-01-16"));
        assert!(!hang.is_past("2024-01-15"));
    }
}
