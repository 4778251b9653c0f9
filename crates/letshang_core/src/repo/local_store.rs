//! Whole-collection snapshot store.
//!
//! # Responsibility
//! - Persist every hang as one JSON document, the way device-local
//!   key/value storage holds them.
//! - Implement `HangRepository` on top of read-modify-rewrite cycles.
//!
//! # Invariants
//! - Every mutation reads the full collection and rewrites it wholesale.
//! - A failed mutation leaves the file unchanged (temp file + rename).
//! - A missing file is an empty collection.

use crate::code::ShareCode;
use crate::model::attendee::{AttendeeId, RsvpStatus};
use crate::model::hang::{Hang, HangValidationError};
use crate::model::suggestion::{Suggestion, SuggestionId};
use crate::repo::hang_repo::{HangRepository, RepoError, RepoResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const SNAPSHOT_VERSION: u32 = 1;

/// Failure while reading or writing the snapshot file.
#[derive(Debug)]
pub enum SnapshotError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    UnsupportedVersion { found: u32, supported: u32 },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "hang snapshot io error at `{}`: {source}", path.display())
            }
            Self::Json(err) => write!(f, "hang snapshot is not valid json: {err}"),
            Self::UnsupportedVersion { found, supported } => write!(
                f,
                "hang snapshot version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    /// Creation order, oldest first.
    hangs: Vec<Hang>,
}

/// JSON-file backed hang repository.
pub struct LocalHangRepository {
    path: PathBuf,
}

impl LocalHangRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> RepoResult<Vec<Hang>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(source).into()),
        };
        let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(SnapshotError::Json)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            }
            .into());
        }
        for hang in &snapshot.hangs {
            hang.validate()?;
        }
        Ok(snapshot.hangs)
    }

    fn store(&self, hangs: Vec<Hang>) -> RepoResult<()> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            hangs,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot).map_err(SnapshotError::Json)?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, bytes).map_err(|source| self.io_error(source))?;
        std::fs::rename(&staging, &self.path).map_err(|source| self.io_error(source))?;

        debug!(
            "event=snapshot_write module=repo status=ok hangs={}",
            snapshot.hangs.len()
        );
        Ok(())
    }

    /// Runs one read-modify-rewrite cycle. Nothing is written when `apply`
    /// fails.
    fn mutate<T>(&self, apply: impl FnOnce(&mut Vec<Hang>) -> RepoResult<T>) -> RepoResult<T> {
        let mut hangs = self.load()?;
        let value = apply(&mut hangs)?;
        self.store(hangs)?;
        Ok(value)
    }

    fn io_error(&self, source: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn hang_mut<'a>(hangs: &'a mut [Hang], code: &ShareCode) -> RepoResult<&'a mut Hang> {
    hangs
        .iter_mut()
        .find(|hang| &hang.code == code)
        .ok_or_else(|| RepoError::HangNotFound(code.clone()))
}

fn owner_mut(hangs: &mut [Hang], suggestion_id: SuggestionId) -> RepoResult<&mut Hang> {
    hangs
        .iter_mut()
        .find(|hang| hang.suggestion(suggestion_id).is_some())
        .ok_or(RepoError::SuggestionNotFound(suggestion_id))
}

impl HangRepository for LocalHangRepository {
    fn create_hang(&self, hang: &Hang) -> RepoResult<ShareCode> {
        hang.validate()?;
        self.mutate(|hangs| {
            if hangs.iter().any(|existing| existing.code == hang.code) {
                return Err(RepoError::DuplicateCode(hang.code.clone()));
            }
            hangs.push(hang.clone());
            Ok(hang.code.clone())
        })
    }

    fn get_hang(&self, code: &ShareCode) -> RepoResult<Option<Hang>> {
        Ok(self.load()?.into_iter().find(|hang| &hang.code == code))
    }

    fn list_hangs(&self) -> RepoResult<Vec<Hang>> {
        let mut hangs = self.load()?;
        hangs.reverse();
        Ok(hangs)
    }

    fn code_exists(&self, code: &ShareCode) -> RepoResult<bool> {
        Ok(self.load()?.iter().any(|hang| &hang.code == code))
    }

    fn set_attendee_status(
        &self,
        code: &ShareCode,
        attendee_id: AttendeeId,
        status: RsvpStatus,
    ) -> RepoResult<()> {
        self.mutate(|hangs| {
            if hang_mut(hangs, code)?.set_status(attendee_id, status) {
                Ok(())
            } else {
                Err(RepoError::AttendeeNotFound(attendee_id))
            }
        })
    }

    fn upsert_attendee(
        &self,
        code: &ShareCode,
        name: &str,
        status: RsvpStatus,
    ) -> RepoResult<AttendeeId> {
        if name.trim().is_empty() {
            return Err(HangValidationError::MissingField("name").into());
        }
        self.mutate(|hangs| Ok(hang_mut(hangs, code)?.upsert_rsvp(name, status)))
    }

    fn insert_suggestion(&self, code: &ShareCode, suggestion: &Suggestion) -> RepoResult<()> {
        if suggestion.content.trim().is_empty() {
            return Err(HangValidationError::EmptySuggestion(suggestion.id).into());
        }
        self.mutate(|hangs| {
            hang_mut(hangs, code)?.suggestions.push(suggestion.clone());
            Ok(())
        })
    }

    fn adjust_votes(&self, suggestion_id: SuggestionId, delta: i64) -> RepoResult<i64> {
        self.mutate(|hangs| {
            owner_mut(hangs, suggestion_id)?
                .apply_vote(suggestion_id, delta)
                .ok_or(RepoError::SuggestionNotFound(suggestion_id))
        })
    }

    fn delete_suggestion(&self, suggestion_id: SuggestionId) -> RepoResult<ShareCode> {
        self.mutate(|hangs| {
            let hang = owner_mut(hangs, suggestion_id)?;
            hang.remove_suggestion(suggestion_id);
            Ok(hang.code.clone())
        })
    }

    fn find_suggestion_hang(&self, suggestion_id: SuggestionId) -> RepoResult<Option<ShareCode>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|hang| hang.suggestion(suggestion_id).is_some())
            .map(|hang| hang.code))
    }
}
