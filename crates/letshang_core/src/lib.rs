//! Core domain logic for Let's Hang.
//! This crate is the single source of truth for hang invariants.

pub mod code;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use code::{ShareCode, ShareCodeError, CODE_LEN};
pub use config::{ConfigError, CoreConfig, StoreKind};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::attendee::{Attendee, AttendeeId, RsvpStatus};
pub use model::hang::{Hang, HangValidationError, NewHang, DEFAULT_MAX_ATTENDEES};
pub use model::suggestion::{Suggestion, SuggestionCategory, SuggestionId, VoteDirection};
pub use repo::hang_repo::{HangRepository, RepoError, RepoResult, SqliteHangRepository};
pub use repo::local_store::{LocalHangRepository, SnapshotError};
pub use repo::store::HangStore;
pub use service::hang_service::{HangService, HangServiceError, ServiceResult, VoteOutcome};
pub use service::vote_session::VoteSession;
pub use view::controller::{Command, ViewController};
pub use view::state::{reduce, Screen, Theme, UiAction, ViewState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
