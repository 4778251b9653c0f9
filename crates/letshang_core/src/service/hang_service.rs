//! Hang use-case service.
//!
//! # Responsibility
//! - Provide create/join/RSVP/suggest/vote entry points for core callers.
//! - Assign collision-checked share codes.
//! - Translate store misses on field-level updates into silent no-ops.
//!
//! # Invariants
//! - Service APIs never bypass repository validation contracts.
//! - The service is storage-agnostic and keeps no hang state of its own.
//! - Log events carry codes and IDs only, never user-entered text.

use crate::code::{ShareCode, ShareCodeError};
use crate::model::attendee::{AttendeeId, RsvpStatus};
use crate::model::hang::{Hang, HangValidationError, NewHang};
use crate::model::suggestion::{Suggestion, SuggestionCategory, SuggestionId, VoteDirection};
use crate::repo::hang_repo::{HangRepository, RepoError};
use crate::service::vote_session::VoteSession;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, HangServiceError>;

/// Service error for hang use-cases.
#[derive(Debug)]
pub enum HangServiceError {
    /// Form input breaks a hang invariant.
    Validation(HangValidationError),
    /// Share code is malformed or no free code could be generated.
    InvalidCode(ShareCodeError),
    /// No hang is stored under this code.
    HangNotFound(ShareCode),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl HangServiceError {
    /// Whether the caller should render this inline rather than as a
    /// blocking error message.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HangNotFound(_) | Self::InvalidCode(_))
    }
}

impl Display for HangServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidCode(err) => write!(f, "{err}"),
            Self::HangNotFound(code) => write!(f, "no hang found for code {code}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent hang state: {details}"),
        }
    }
}

impl Error for HangServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidCode(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for HangServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::HangNotFound(code) => Self::HangNotFound(code),
            other => Self::Repo(other),
        }
    }
}

impl From<HangValidationError> for HangServiceError {
    fn from(value: HangValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ShareCodeError> for HangServiceError {
    fn from(value: ShareCodeError) -> Self {
        Self::InvalidCode(value)
    }
}

/// Result of a session-locked vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Vote stored; carries the new tally.
    Applied { votes: i64 },
    /// This session already voted on the suggestion; nothing was sent.
    AlreadyVoted,
    /// The suggestion no longer exists.
    Missing,
}

/// Hang service facade over repository implementations.
pub struct HangService<R: HangRepository> {
    repo: R,
}

impl<R: HangRepository> HangService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Underlying repository, for callers that need store-level access.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates a hang from form input and returns the stored record.
    ///
    /// # Contract
    /// - Title, date, time and location must be non-empty.
    /// - Capacity defaults to `DEFAULT_MAX_ATTENDEES` on blank/garbage input.
    /// - `host` is seeded as the first attendee with status going.
    /// - The share code is checked against the store before use.
    pub fn create_hang(&self, input: NewHang, host: &str) -> ServiceResult<Hang> {
        let code = ShareCode::generate_unique(|candidate| {
            self.repo
                .code_exists(candidate)
                .map_err(HangServiceError::from)
        })?;
        let hang = input.into_hang(code, host);
        hang.validate()?;

        let code = match self.repo.create_hang(&hang) {
            Ok(code) => code,
            Err(err) => {
                warn!("event=hang_create module=service status=error error={err}");
                return Err(err.into());
            }
        };
        info!(
            "event=hang_create module=service status=ok code={} max_attendees={}",
            code, hang.max_attendees
        );

        self.repo
            .get_hang(&code)?
            .ok_or(HangServiceError::InconsistentState(
                "created hang not found in read-back",
            ))
    }

    /// Gets one hang by code.
    pub fn get_hang(&self, code: &ShareCode) -> ServiceResult<Option<Hang>> {
        Ok(self.repo.get_hang(code)?)
    }

    /// Resolves a hang from raw invitee input (possibly lowercase or padded).
    ///
    /// # Errors
    /// - `InvalidCode` when the input is not a well-formed code.
    /// - `HangNotFound` when no hang has this code.
    pub fn join(&self, raw_code: &str) -> ServiceResult<Hang> {
        let code = ShareCode::parse(raw_code)?;
        match self.repo.get_hang(&code)? {
            Some(hang) => {
                info!("event=hang_join module=service status=ok code={code}");
                Ok(hang)
            }
            None => {
                info!("event=hang_join module=service status=not_found code={code}");
                Err(HangServiceError::HangNotFound(code))
            }
        }
    }

    /// Lists all hangs, most recently created first.
    pub fn list_hangs(&self) -> ServiceResult<Vec<Hang>> {
        Ok(self.repo.list_hangs()?)
    }

    /// Hangs scheduled on or after `today` (`YYYY-MM-DD`).
    pub fn upcoming_hangs(&self, today: &str) -> ServiceResult<Vec<Hang>> {
        let mut hangs = self.list_hangs()?;
        hangs.retain(|hang| !hang.is_past(today));
        Ok(hangs)
    }

    /// Hangs scheduled strictly before `today` (`YYYY-MM-DD`).
    pub fn past_hangs(&self, today: &str) -> ServiceResult<Vec<Hang>> {
        let mut hangs = self.list_hangs()?;
        hangs.retain(|hang| hang.is_past(today));
        Ok(hangs)
    }

    /// Overwrites one attendee's RSVP.
    ///
    /// Returns `Ok(false)` without touching storage state when the hang or
    /// the attendee is unknown.
    pub fn set_rsvp(
        &self,
        code: &ShareCode,
        attendee_id: AttendeeId,
        status: RsvpStatus,
    ) -> ServiceResult<bool> {
        match self.repo.set_attendee_status(code, attendee_id, status) {
            Ok(()) => {
                info!(
                    "event=rsvp_set module=service status=ok code={code} attendee={attendee_id} rsvp={}",
                    status.as_str()
                );
                Ok(true)
            }
            Err(RepoError::HangNotFound(_) | RepoError::AttendeeNotFound(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Sets the RSVP of the attendee named `name`, adding them if needed.
    ///
    /// Returns `Ok(None)` when the hang is unknown.
    pub fn rsvp_as(
        &self,
        code: &ShareCode,
        name: &str,
        status: RsvpStatus,
    ) -> ServiceResult<Option<AttendeeId>> {
        match self.repo.upsert_attendee(code, name, status) {
            Ok(attendee_id) => {
                info!(
                    "event=rsvp_upsert module=service status=ok code={code} attendee={attendee_id} rsvp={}",
                    status.as_str()
                );
                Ok(Some(attendee_id))
            }
            Err(RepoError::HangNotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Appends a suggestion with zero votes.
    ///
    /// Returns `Ok(None)` for blank content or an unknown hang.
    pub fn add_suggestion(
        &self,
        code: &ShareCode,
        category: SuggestionCategory,
        content: &str,
    ) -> ServiceResult<Option<Suggestion>> {
        self.add_suggestion_as(code, category, content, None)
    }

    /// Like `add_suggestion`, recording `author` on the suggestion.
    pub fn add_suggestion_as(
        &self,
        code: &ShareCode,
        category: SuggestionCategory,
        content: &str,
        author: Option<&str>,
    ) -> ServiceResult<Option<Suggestion>> {
        let Some(suggestion) = Suggestion::new(category, content) else {
            return Ok(None);
        };
        let suggestion = suggestion.with_author(author.map(str::to_string));

        match self.repo.insert_suggestion(code, &suggestion) {
            Ok(()) => {
                info!(
                    "event=suggestion_add module=service status=ok code={code} suggestion={} category={}",
                    suggestion.id,
                    category.as_str()
                );
                Ok(Some(suggestion))
            }
            Err(RepoError::HangNotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Adds `delta` to a suggestion's tally without any session lock.
    ///
    /// Returns `Ok(None)` when the suggestion is unknown.
    pub fn apply_vote(&self, suggestion_id: SuggestionId, delta: i64) -> ServiceResult<Option<i64>> {
        match self.repo.adjust_votes(suggestion_id, delta) {
            Ok(votes) => Ok(Some(votes)),
            Err(RepoError::SuggestionNotFound(_)) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Votes once per session on a suggestion.
    ///
    /// The session is locked only after the store accepted the vote, so a
    /// failed request can be retried.
    pub fn vote(
        &self,
        session: &mut VoteSession,
        suggestion_id: SuggestionId,
        direction: VoteDirection,
    ) -> ServiceResult<VoteOutcome> {
        if session.has_voted(suggestion_id) {
            return Ok(VoteOutcome::AlreadyVoted);
        }
        match self.apply_vote(suggestion_id, direction.delta())? {
            Some(votes) => {
                session.record(suggestion_id);
                info!(
                    "event=suggestion_vote module=service status=ok suggestion={suggestion_id} delta={}",
                    direction.delta()
                );
                Ok(VoteOutcome::Applied { votes })
            }
            None => Ok(VoteOutcome::Missing),
        }
    }

    /// Deletes a suggestion with no ownership check.
    ///
    /// Returns `Ok(false)` when the suggestion is unknown.
    pub fn remove_suggestion(&self, suggestion_id: SuggestionId) -> ServiceResult<bool> {
        match self.repo.delete_suggestion(suggestion_id) {
            Ok(code) => {
                info!(
                    "event=suggestion_remove module=service status=ok code={code} suggestion={suggestion_id}"
                );
                Ok(true)
            }
            Err(RepoError::SuggestionNotFound(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Code of the hang owning a suggestion, if it still exists.
    pub fn suggestion_hang(&self, suggestion_id: SuggestionId) -> ServiceResult<Option<ShareCode>> {
        Ok(self.repo.find_suggestion_hang(suggestion_id)?)
    }
}
