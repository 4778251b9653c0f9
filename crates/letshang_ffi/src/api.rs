//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose hang use-cases to Dart via FRB as sync calls.
//! - Flatten core results into response envelopes with stable fields.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store selection is resolved once per process from `LETSHANG_*` env.
//! - Vote locking lives in one process-wide session.

use letshang_core::db::{open_db, open_db_in_memory};
use letshang_core::view::invite;
use letshang_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    init_logging_from_config, ping as ping_inner, CoreConfig, Hang, HangService, HangStore,
    LocalHangRepository, NewHang, RsvpStatus, ServiceResult, ShareCode, SqliteHangRepository,
    StoreKind, SuggestionCategory, VoteDirection, VoteOutcome, VoteSession,
};
use log::warn;
use rusqlite::Connection;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

static CONFIG: OnceLock<Result<CoreConfig, String>> = OnceLock::new();
static MEMORY_DB: OnceLock<Mutex<Option<Connection>>> = OnceLock::new();
static VOTE_SESSION: OnceLock<Mutex<VoteSession>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Attendee row inside a `HangView`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeView {
    pub id: String,
    pub name: String,
    /// `going|maybe|not-going`.
    pub status: String,
}

/// Suggestion row inside a `HangView`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionView {
    pub id: String,
    /// `time|location|general`.
    pub category: String,
    pub content: String,
    pub votes: i64,
    pub author: Option<String>,
    /// Whether this process already voted on the suggestion.
    pub voted: bool,
}

/// Flattened hang record for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HangView {
    pub code: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: Option<String>,
    pub host: String,
    pub max_attendees: u32,
    pub going_count: u32,
    /// Capacity label such as `3 of 10`.
    pub headcount: String,
    pub invite_url: String,
    pub attendees: Vec<AttendeeView>,
    pub suggestions: Vec<SuggestionView>,
}

/// Generic action response envelope for hang commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HangActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Share code, or the affected record ID, on success.
    pub code: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl HangActionResponse {
    fn success(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            ok: true,
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Accepted input that changed nothing.
    fn noop(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            code: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code: None,
            message: message.into(),
        }
    }
}

/// Lookup envelope for join-by-code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HangLookupResponse {
    pub hang: Option<HangView>,
    /// Set when the code is malformed or unknown; render inline.
    pub not_found: bool,
    pub message: String,
}

/// Listing envelope split on a reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HangListResponse {
    pub upcoming: Vec<HangView>,
    pub past: Vec<HangView>,
    pub message: String,
}

/// Creates a hang from form input with `host` as first going attendee.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - `max_attendees` keeps its leading digits; no digits or zero means 10.
/// - Returns the share code on success.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_create(
    title: String,
    date: String,
    time: String,
    location: String,
    description: Option<String>,
    max_attendees: Option<String>,
    host: String,
) -> HangActionResponse {
    let input = NewHang {
        title,
        date,
        time,
        location,
        description,
        max_attendees,
    };
    match with_hang_service(|service| service.create_hang(input, host.trim())) {
        Ok(hang) => HangActionResponse::success("Hang created.", hang.code),
        Err(err) => HangActionResponse::failure(format!("hang_create failed: {err}")),
    }
}

/// Resolves a hang from a typed code or a full invite URL.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_join(code_or_url: String) -> HangLookupResponse {
    let raw = invite::code_from_url(&code_or_url).unwrap_or(code_or_url);
    let config = match resolve_config() {
        Ok(config) => config,
        Err(err) => return lookup_failure(format!("hang_join failed: {err}"), false),
    };

    let mut not_found = false;
    let result = with_hang_service(|service| {
        service.join(&raw).map_err(|err| {
            not_found = err.is_not_found();
            err
        })
    });
    match result {
        Ok(hang) => HangLookupResponse {
            hang: Some(to_hang_view(&hang, config)),
            not_found: false,
            message: "Hang found.".to_string(),
        },
        Err(_) if not_found => lookup_failure(
            format!("No hang found for code {}", raw.trim().to_ascii_uppercase()),
            true,
        ),
        Err(err) => lookup_failure(format!("hang_join failed: {err}"), false),
    }
}

/// Lists hangs newest first, split into upcoming and past on `today`.
///
/// `today` is `YYYY-MM-DD` in the caller's local calendar.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_list(today: String) -> HangListResponse {
    let config = match resolve_config() {
        Ok(config) => config,
        Err(err) => return list_failure(format!("hang_list failed: {err}")),
    };
    match with_hang_service(|service| service.list_hangs()) {
        Ok(hangs) => {
            let (past, upcoming): (Vec<Hang>, Vec<Hang>) =
                hangs.into_iter().partition(|hang| hang.is_past(&today));
            let message = format!("{} upcoming, {} past.", upcoming.len(), past.len());
            HangListResponse {
                upcoming: upcoming.iter().map(|h| to_hang_view(h, config)).collect(),
                past: past.iter().map(|h| to_hang_view(h, config)).collect(),
                message,
            }
        }
        Err(err) => list_failure(format!("hang_list failed: {err}")),
    }
}

/// Overwrites one attendee's RSVP (`going|maybe|not-going`).
///
/// Unknown hang or attendee is a silent no-op reported with `ok=true`.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_rsvp(code: String, attendee_id: String, status: String) -> HangActionResponse {
    let parsed = parse_code(&code).and_then(|code| {
        let attendee_id = parse_id(&attendee_id, "attendee_id")?;
        let status = parse_status(&status)?;
        Ok((code, attendee_id, status))
    });
    let (code, attendee_id, status) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return HangActionResponse::failure(format!("hang_rsvp failed: {err}")),
    };

    match with_hang_service(|service| service.set_rsvp(&code, attendee_id, status)) {
        Ok(true) => HangActionResponse::success("RSVP saved.", code),
        Ok(false) => HangActionResponse::noop("Nothing to update."),
        Err(err) => HangActionResponse::failure(format!("hang_rsvp failed: {err}")),
    }
}

/// Sets the RSVP of the attendee named `name`, adding them when new.
///
/// Returns the attendee ID in `code` on success.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_rsvp_as(code: String, name: String, status: String) -> HangActionResponse {
    let parsed = parse_code(&code).and_then(|code| Ok((code, parse_status(&status)?)));
    let (code, status) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return HangActionResponse::failure(format!("hang_rsvp_as failed: {err}")),
    };

    match with_hang_service(|service| service.rsvp_as(&code, &name, status)) {
        Ok(Some(attendee_id)) => HangActionResponse::success("RSVP saved.", attendee_id.to_string()),
        Ok(None) => HangActionResponse::failure(format!("No hang found for code {code}")),
        Err(err) => HangActionResponse::failure(format!("hang_rsvp_as failed: {err}")),
    }
}

/// Appends a suggestion (`time|location|general`) with zero votes.
///
/// Blank content or an unknown hang is a no-op reported with `ok=true`
/// and no ID.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_suggest(
    code: String,
    category: String,
    content: String,
    author: Option<String>,
) -> HangActionResponse {
    let parsed = parse_code(&code).and_then(|code| {
        let category = SuggestionCategory::parse(&category)
            .ok_or_else(|| format!("unknown suggestion category `{category}`"))?;
        Ok((code, category))
    });
    let (code, category) = match parsed {
        Ok(parsed) => parsed,
        Err(err) => return HangActionResponse::failure(format!("hang_suggest failed: {err}")),
    };

    match with_hang_service(|service| {
        service.add_suggestion_as(&code, category, &content, author.as_deref())
    }) {
        Ok(Some(suggestion)) => {
            HangActionResponse::success("Suggestion added.", suggestion.id.to_string())
        }
        Ok(None) => HangActionResponse::noop("Nothing to add."),
        Err(err) => HangActionResponse::failure(format!("hang_suggest failed: {err}")),
    }
}

/// Votes once per process on a suggestion.
///
/// `up=true` adds one, `up=false` subtracts one. A second vote on the
/// same suggestion is rejected with `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_vote(suggestion_id: String, up: bool) -> HangActionResponse {
    let suggestion_id = match parse_id(&suggestion_id, "suggestion_id") {
        Ok(id) => id,
        Err(err) => return HangActionResponse::failure(format!("hang_vote failed: {err}")),
    };
    let direction = if up {
        VoteDirection::Up
    } else {
        VoteDirection::Down
    };
    let mut session = match vote_session().lock() {
        Ok(session) => session,
        Err(_) => return HangActionResponse::failure("hang_vote failed: vote session poisoned"),
    };

    match with_hang_service(|service| service.vote(&mut *session, suggestion_id, direction)) {
        Ok(VoteOutcome::Applied { votes }) => {
            HangActionResponse::success(format!("Votes: {votes}."), suggestion_id.to_string())
        }
        Ok(VoteOutcome::AlreadyVoted) => HangActionResponse::failure("Already voted."),
        Ok(VoteOutcome::Missing) => HangActionResponse::failure("Suggestion not found."),
        Err(err) => HangActionResponse::failure(format!("hang_vote failed: {err}")),
    }
}

/// Deletes a suggestion. Unknown IDs are a no-op reported with `ok=true`.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_remove_suggestion(suggestion_id: String) -> HangActionResponse {
    let suggestion_id = match parse_id(&suggestion_id, "suggestion_id") {
        Ok(id) => id,
        Err(err) => {
            return HangActionResponse::failure(format!("hang_remove_suggestion failed: {err}"))
        }
    };
    match with_hang_service(|service| service.remove_suggestion(suggestion_id)) {
        Ok(true) => HangActionResponse::success("Suggestion removed.", suggestion_id.to_string()),
        Ok(false) => HangActionResponse::noop("Nothing to remove."),
        Err(err) => HangActionResponse::failure(format!("hang_remove_suggestion failed: {err}")),
    }
}

/// Share sheet text for a hang, invite link included.
///
/// Returns an empty string when the hang cannot be resolved.
#[flutter_rust_bridge::frb(sync)]
pub fn hang_share_message(code: String) -> String {
    let Ok(config) = resolve_config() else {
        return String::new();
    };
    match with_hang_service(|service| service.join(&code)) {
        Ok(hang) => invite::share_message(&hang, &config.invite_base_url),
        Err(_) => String::new(),
    }
}

fn resolve_config() -> Result<&'static CoreConfig, String> {
    CONFIG
        .get_or_init(|| {
            let config = CoreConfig::from_env().map_err(|err| {
                warn!("event=config_resolve module=ffi status=error error={err}");
                err.to_string()
            })?;
            // Env-driven logging is best effort; `init_logging` stays available.
            if let Err(err) = init_logging_from_config(&config) {
                warn!("event=config_resolve module=ffi status=degraded error={err}");
            }
            Ok(config)
        })
        .as_ref()
        .map_err(Clone::clone)
}

fn vote_session() -> &'static Mutex<VoteSession> {
    VOTE_SESSION.get_or_init(|| Mutex::new(VoteSession::new()))
}

fn with_hang_service<T>(
    f: impl FnOnce(&HangService<HangStore<'_>>) -> ServiceResult<T>,
) -> Result<T, String> {
    let config = resolve_config()?;
    match config.store {
        StoreKind::Sqlite => {
            let conn =
                open_db(&config.db_path).map_err(|err| format!("hang DB open failed: {err}"))?;
            let service = HangService::new(HangStore::Sqlite(SqliteHangRepository::new(&conn)));
            f(&service).map_err(|err| err.to_string())
        }
        StoreKind::Local => {
            let repo = LocalHangRepository::new(config.local_path.clone());
            let service = HangService::new(HangStore::Local(repo));
            f(&service).map_err(|err| err.to_string())
        }
        StoreKind::Memory => {
            let mut guard = MEMORY_DB
                .get_or_init(|| Mutex::new(None))
                .lock()
                .map_err(|_| "in-memory hang DB poisoned".to_string())?;
            if guard.is_none() {
                let conn =
                    open_db_in_memory().map_err(|err| format!("hang DB open failed: {err}"))?;
                *guard = Some(conn);
            }
            let conn = guard
                .as_ref()
                .ok_or_else(|| "in-memory hang DB unavailable".to_string())?;
            let service = HangService::new(HangStore::Sqlite(SqliteHangRepository::new(conn)));
            f(&service).map_err(|err| err.to_string())
        }
    }
}

fn parse_code(raw: &str) -> Result<ShareCode, String> {
    ShareCode::parse(raw).map_err(|err| err.to_string())
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("{field} is not a valid ID"))
}

fn parse_status(raw: &str) -> Result<RsvpStatus, String> {
    RsvpStatus::parse(raw).ok_or_else(|| format!("unknown RSVP status `{raw}`"))
}

fn lookup_failure(message: String, not_found: bool) -> HangLookupResponse {
    HangLookupResponse {
        hang: None,
        not_found,
        message,
    }
}

fn list_failure(message: String) -> HangListResponse {
    HangListResponse {
        upcoming: Vec::new(),
        past: Vec::new(),
        message,
    }
}

fn to_hang_view(hang: &Hang, config: &CoreConfig) -> HangView {
    let session = vote_session().lock().ok();
    let voted = |id| session.as_ref().is_some_and(|session| session.has_voted(id));

    HangView {
        code: hang.code.to_string(),
        title: hang.title.clone(),
        date: hang.date.clone(),
        time: hang.time.clone(),
        location: hang.location.clone(),
        description: hang.description.clone(),
        host: hang.host.clone(),
        max_attendees: hang.max_attendees,
        going_count: u32::try_from(hang.going_count()).unwrap_or(u32::MAX),
        headcount: hang.headcount_label(),
        invite_url: invite::invite_url(&config.invite_base_url, &hang.code),
        attendees: hang
            .attendees
            .iter()
            .map(|attendee| AttendeeView {
                id: attendee.id.to_string(),
                name: attendee.name.clone(),
                status: attendee.status.as_str().to_string(),
            })
            .collect(),
        suggestions: hang
            .suggestions
            .iter()
            .map(|suggestion| SuggestionView {
                id: suggestion.id.to_string(),
                category: suggestion.category.as_str().to_string(),
                content: suggestion.content.clone(),
                votes: suggestion.votes,
                author: suggestion.author.clone(),
                voted: voted(suggestion.id),
            })
            .collect(),
    }
}
