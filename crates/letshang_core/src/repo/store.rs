//! Runtime-selected store.
//!
//! Lets callers pick a persistence flavour from `CoreConfig` while the
//! service stays generic over one `HangRepository` type.

use crate::code::ShareCode;
use crate::model::attendee::{AttendeeId, RsvpStatus};
use crate::model::hang::Hang;
use crate::model::suggestion::{Suggestion, SuggestionId};
use crate::repo::hang_repo::{HangRepository, RepoResult, SqliteHangRepository};
use crate::repo::local_store::LocalHangRepository;

pub enum HangStore<'conn> {
    /// File or in-memory SQLite connection.
    Sqlite(SqliteHangRepository<'conn>),
    /// Whole-collection JSON snapshot.
    Local(LocalHangRepository),
}

impl HangStore<'_> {
    fn inner(&self) -> &dyn HangRepository {
        match self {
            Self::Sqlite(repo) => repo,
            Self::Local(repo) => repo,
        }
    }
}

impl HangRepository for HangStore<'_> {
    fn create_hang(&self, hang: &Hang) -> RepoResult<ShareCode> {
        self.inner().create_hang(hang)
    }

    fn get_hang(&self, code: &ShareCode) -> RepoResult<Option<Hang>> {
        self.inner().get_hang(code)
    }

    fn list_hangs(&self) -> RepoResult<Vec<Hang>> {
        self.inner().list_hangs()
    }

    fn code_exists(&self, code: &ShareCode) -> RepoResult<bool> {
        self.inner().code_exists(code)
    }

    fn set_attendee_status(
        &self,
        code: &ShareCode,
        attendee_id: AttendeeId,
        status: RsvpStatus,
    ) -> RepoResult<()> {
        self.inner().set_attendee_status(code, attendee_id, status)
    }

    fn upsert_attendee(
        &self,
        code: &ShareCode,
        name: &str,
        status: RsvpStatus,
    ) -> RepoResult<AttendeeId> {
        self.inner().upsert_attendee(code, name, status)
    }

    fn insert_suggestion(&self, code: &ShareCode, suggestion: &Suggestion) -> RepoResult<()> {
        self.inner().insert_suggestion(code, suggestion)
    }

    fn adjust_votes(&self, suggestion_id: SuggestionId, delta: i64) -> RepoResult<i64> {
        self.inner().adjust_votes(suggestion_id, delta)
    }

    fn delete_suggestion(&self, suggestion_id: SuggestionId) -> RepoResult<ShareCode> {
        self.inner().delete_suggestion(suggestion_id)
    }

    fn find_suggestion_hang(&self, suggestion_id: SuggestionId) -> RepoResult<Option<ShareCode>> {
        self.inner().find_suggestion_hang(suggestion_id)
    }
}
