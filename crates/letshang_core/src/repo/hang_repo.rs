//! Hang repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/field-level update APIs over hang storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate before SQL mutations.
//! - Multi-row writes run in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Attendees and suggestions are returned in insertion order.

use crate::code::{ShareCode, ShareCodeError};
use crate::db::DbError;
use crate::model::attendee::{Attendee, AttendeeId, RsvpStatus};
use crate::model::hang::{Hang, HangValidationError};
use crate::model::suggestion::{Suggestion, SuggestionCategory, SuggestionId};
use crate::repo::local_store::SnapshotError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const HANG_SELECT_SQL: &str = "SELECT
    code,
    title,
    date,
    time,
    location,
    description,
    max_attendees,
    host
FROM hangs";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for hang persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(HangValidationError),
    Db(DbError),
    Snapshot(SnapshotError),
    HangNotFound(ShareCode),
    AttendeeNotFound(AttendeeId),
    SuggestionNotFound(SuggestionId),
    DuplicateCode(ShareCode),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::HangNotFound(code) => write!(f, "hang not found: {code}"),
            Self::AttendeeNotFound(id) => write!(f, "attendee not found: {id}"),
            Self::SuggestionNotFound(id) => write!(f, "suggestion not found: {id}"),
            Self::DuplicateCode(code) => write!(f, "hang code already in use: {code}"),
            Self::InvalidData(message) => write!(f, "invalid persisted hang data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HangValidationError> for RepoError {
    fn from(value: HangValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SnapshotError> for RepoError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Repository interface for hang storage.
///
/// Implementations: `SqliteHangRepository` (file or in-memory connection)
/// and `LocalHangRepository` (whole-collection JSON snapshot).
pub trait HangRepository {
    /// Persists a new hang with its seeded attendees and suggestions.
    fn create_hang(&self, hang: &Hang) -> RepoResult<ShareCode>;
    fn get_hang(&self, code: &ShareCode) -> RepoResult<Option<Hang>>;
    /// Lists all hangs, most recently created first.
    fn list_hangs(&self) -> RepoResult<Vec<Hang>>;
    fn code_exists(&self, code: &ShareCode) -> RepoResult<bool>;
    fn set_attendee_status(
        &self,
        code: &ShareCode,
        attendee_id: AttendeeId,
        status: RsvpStatus,
    ) -> RepoResult<()>;
    /// Updates the attendee with a matching display name or appends one.
    fn upsert_attendee(
        &self,
        code: &ShareCode,
        name: &str,
        status: RsvpStatus,
    ) -> RepoResult<AttendeeId>;
    fn insert_suggestion(&self, code: &ShareCode, suggestion: &Suggestion) -> RepoResult<()>;
    /// Adds `delta` to a suggestion's tally and returns the new tally.
    fn adjust_votes(&self, suggestion_id: SuggestionId, delta: i64) -> RepoResult<i64>;
    /// Deletes a suggestion and returns the code of the hang it belonged to.
    fn delete_suggestion(&self, suggestion_id: SuggestionId) -> RepoResult<ShareCode>;
    fn find_suggestion_hang(&self, suggestion_id: SuggestionId) -> RepoResult<Option<ShareCode>>;
}

/// SQLite-backed hang repository.
pub struct SqliteHangRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHangRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn require_hang(&self, code: &ShareCode) -> RepoResult<()> {
        if self.code_exists(code)? {
            Ok(())
        } else {
            Err(RepoError::HangNotFound(code.clone()))
        }
    }

    fn load_attendees(&self, code: &ShareCode) -> RepoResult<Vec<Attendee>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, status FROM attendees WHERE hang_code = ?1 ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([code.as_str()])?;
        let mut attendees = Vec::new();
        while let Some(row) = rows.next()? {
            attendees.push(parse_attendee_row(row)?);
        }
        Ok(attendees)
    }

    fn load_suggestions(&self, code: &ShareCode) -> RepoResult<Vec<Suggestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, category, content, votes, author
             FROM suggestions
             WHERE hang_code = ?1
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([code.as_str()])?;
        let mut suggestions = Vec::new();
        while let Some(row) = rows.next()? {
            suggestions.push(parse_suggestion_row(row)?);
        }
        Ok(suggestions)
    }

    fn hydrate(&self, mut hang: Hang) -> RepoResult<Hang> {
        hang.attendees = self.load_attendees(&hang.code)?;
        hang.suggestions = self.load_suggestions(&hang.code)?;
        hang.validate()?;
        Ok(hang)
    }
}

impl HangRepository for SqliteHangRepository<'_> {
    fn create_hang(&self, hang: &Hang) -> RepoResult<ShareCode> {
        hang.validate()?;
        if self.code_exists(&hang.code)? {
            return Err(RepoError::DuplicateCode(hang.code.clone()));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO hangs (
                code,
                title,
                date,
                time,
                location,
                description,
                max_attendees,
                host
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                hang.code.as_str(),
                hang.title.as_str(),
                hang.date.as_str(),
                hang.time.as_str(),
                hang.location.as_str(),
                hang.description.as_deref(),
                hang.max_attendees,
                hang.host.as_str(),
            ],
        )?;
        for attendee in &hang.attendees {
            insert_attendee(&tx, &hang.code, attendee)?;
        }
        for suggestion in &hang.suggestions {
            insert_suggestion_row(&tx, &hang.code, suggestion)?;
        }
        tx.commit()?;

        Ok(hang.code.clone())
    }

    fn get_hang(&self, code: &ShareCode) -> RepoResult<Option<Hang>> {
        let hang = self
            .conn
            .query_row(
                &format!("{HANG_SELECT_SQL} WHERE code = ?1;"),
                [code.as_str()],
                |row| Ok(parse_hang_row(row)),
            )
            .optional()?;

        match hang {
            Some(parsed) => Ok(Some(self.hydrate(parsed?)?)),
            None => Ok(None),
        }
    }

    fn list_hangs(&self) -> RepoResult<Vec<Hang>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HANG_SELECT_SQL} ORDER BY rowid DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut headers = Vec::new();
        while let Some(row) = rows.next()? {
            headers.push(parse_hang_row(row)?);
        }

        headers
            .into_iter()
            .map(|hang| self.hydrate(hang))
            .collect()
    }

    fn code_exists(&self, code: &ShareCode) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM hangs WHERE code = ?1);",
            [code.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn set_attendee_status(
        &self,
        code: &ShareCode,
        attendee_id: AttendeeId,
        status: RsvpStatus,
    ) -> RepoResult<()> {
        self.require_hang(code)?;
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE attendees SET status = ?1 WHERE hang_code = ?2 AND id = ?3;",
            params![status.as_str(), code.as_str(), attendee_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::AttendeeNotFound(attendee_id));
        }
        touch_hang(&tx, code)?;
        tx.commit()?;
        Ok(())
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
        let mut hang = self
            .get_hang(code)?
            .ok_or_else(|| RepoError::HangNotFound(code.clone()))?;
        let known = hang.attendees.len();
        let attendee_id = hang.upsert_rsvp(name, status);

        let tx = self.conn.unchecked_transaction()?;
        if hang.attendees.len() > known {
            if let Some(added) = hang.attendee(attendee_id) {
                insert_attendee(&tx, code, added)?;
            }
        } else {
            tx.execute(
                "UPDATE attendees SET status = ?1 WHERE id = ?2;",
                params![status.as_str(), attendee_id.to_string()],
            )?;
        }
        touch_hang(&tx, code)?;
        tx.commit()?;
        Ok(attendee_id)
    }

    fn insert_suggestion(&self, code: &ShareCode, suggestion: &Suggestion) -> RepoResult<()> {
        if suggestion.content.trim().is_empty() {
            return Err(HangValidationError::EmptySuggestion(suggestion.id).into());
        }
        self.require_hang(code)?;
        let tx = self.conn.unchecked_transaction()?;
        insert_suggestion_row(&tx, code, suggestion)?;
        touch_hang(&tx, code)?;
        tx.commit()?;
        Ok(())
    }

    fn adjust_votes(&self, suggestion_id: SuggestionId, delta: i64) -> RepoResult<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let updated = tx
            .query_row(
                "UPDATE suggestions SET votes = votes + ?1 WHERE id = ?2
                 RETURNING votes, hang_code;",
                params![delta, suggestion_id.to_string()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let (votes, code_text) = updated.ok_or(RepoError::SuggestionNotFound(suggestion_id))?;
        touch_hang(&tx, &parse_code(&code_text, "suggestions.hang_code")?)?;
        tx.commit()?;
        Ok(votes)
    }

    fn delete_suggestion(&self, suggestion_id: SuggestionId) -> RepoResult<ShareCode> {
        let code = self
            .find_suggestion_hang(suggestion_id)?
            .ok_or(RepoError::SuggestionNotFound(suggestion_id))?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM suggestions WHERE id = ?1;",
            [suggestion_id.to_string()],
        )?;
        touch_hang(&tx, &code)?;
        tx.commit()?;
        Ok(code)
    }

    fn find_suggestion_hang(&self, suggestion_id: SuggestionId) -> RepoResult<Option<ShareCode>> {
        let code_text = self
            .conn
            .query_row(
                "SELECT hang_code FROM suggestions WHERE id = ?1;",
                [suggestion_id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        code_text
            .map(|text| parse_code(&text, "suggestions.hang_code"))
            .transpose()
    }
}

/// Bumps `updated_at`; callers run it inside the write's transaction.
fn touch_hang(conn: &Connection, code: &ShareCode) -> RepoResult<()> {
    conn.execute(
        "UPDATE hangs SET updated_at = (strftime('%s', 'now') * 1000) WHERE code = ?1;",
        [code.as_str()],
    )?;
    Ok(())
}

fn insert_attendee(conn: &Connection, code: &ShareCode, attendee: &Attendee) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO attendees (id, hang_code, name, status) VALUES (?1, ?2, ?3, ?4);",
        params![
            attendee.id.to_string(),
            code.as_str(),
            attendee.name.as_str(),
            attendee.status.as_str(),
        ],
    )?;
    Ok(())
}

fn insert_suggestion_row(
    conn: &Connection,
    code: &ShareCode,
    suggestion: &Suggestion,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO suggestions (id, hang_code, category, content, votes, author)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            suggestion.id.to_string(),
            code.as_str(),
            suggestion.category.as_str(),
            suggestion.content.as_str(),
            suggestion.votes,
            suggestion.author.as_deref(),
        ],
    )?;
    Ok(())
}

fn parse_hang_row(row: &Row<'_>) -> RepoResult<Hang> {
    let code_text: String = row.get("code")?;
    Ok(Hang {
        code: parse_code(&code_text, "hangs.code")?,
        title: row.get("title")?,
        date: row.get("date")?,
        time: row.get("time")?,
        location: row.get("location")?,
        description: row.get("description")?,
        max_attendees: row.get("max_attendees")?,
        attendees: Vec::new(),
        suggestions: Vec::new(),
        host: row.get("host")?,
    })
}

fn parse_attendee_row(row: &Row<'_>) -> RepoResult<Attendee> {
    let status_text: String = row.get("status")?;
    let status = RsvpStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid rsvp status `{status_text}` in attendees.status"
        ))
    })?;
    Ok(Attendee {
        id: parse_uuid(row, "attendees.id")?,
        name: row.get("name")?,
        status,
    })
}

fn parse_suggestion_row(row: &Row<'_>) -> RepoResult<Suggestion> {
    let category_text: String = row.get("category")?;
    let category = SuggestionCategory::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid suggestion category `{category_text}` in suggestions.category"
        ))
    })?;
    Ok(Suggestion {
        id: parse_uuid(row, "suggestions.id")?,
        content: row.get("content")?,
        category,
        votes: row.get("votes")?,
        author: row.get("author")?,
    })
}

fn parse_uuid(row: &Row<'_>, column: &str) -> RepoResult<Uuid> {
    let text: String = row.get("id")?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}

fn parse_code(text: &str, column: &str) -> RepoResult<ShareCode> {
    ShareCode::parse(text).map_err(|err: ShareCodeError| {
        RepoError::InvalidData(format!("invalid share code `{text}` in {column}: {err}"))
    })
}
