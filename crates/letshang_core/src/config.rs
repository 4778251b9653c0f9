//! Runtime configuration resolved from the process environment.
//!
//! # Responsibility
//! - Pick the store flavour and its on-disk location.
//! - Carry logging and invite-link settings to the embedding layer.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - Resolution never touches the filesystem.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_STORE: &str = "LETSHANG_STORE";
pub const ENV_DB_PATH: &str = "LETSHANG_DB_PATH";
pub const ENV_LOCAL_PATH: &str = "LETSHANG_LOCAL_PATH";
pub const ENV_LOG_LEVEL: &str = "LETSHANG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LETSHANG_LOG_DIR";
pub const ENV_INVITE_BASE_URL: &str = "LETSHANG_INVITE_BASE_URL";

const DEFAULT_DB_FILE_NAME: &str = "letshang.sqlite3";
const DEFAULT_LOCAL_FILE_NAME: &str = "letshang_hangs.json";
const DEFAULT_INVITE_BASE_URL: &str = "https://letshang.app/";

/// Persistence flavour backing the hang store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// SQLite file, one transaction per write.
    Sqlite,
    /// Whole-collection JSON snapshot.
    Local,
    /// In-memory SQLite; nothing survives the connection.
    Memory,
}

impl StoreKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(Self::Sqlite),
            "local" => Some(Self::Local),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidStore(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStore(value) => write!(
                f,
                "{ENV_STORE} must be sqlite|local|memory, got `{value}`"
            ),
            Self::InvalidLogLevel(message) => write!(f, "{ENV_LOG_LEVEL}: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub store: StoreKind,
    pub db_path: PathBuf,
    pub local_path: PathBuf,
    pub log_level: &'static str,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub invite_base_url: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let tmp = std::env::temp_dir();
        Self {
            store: StoreKind::Sqlite,
            db_path: tmp.join(DEFAULT_DB_FILE_NAME),
            local_path: tmp.join(DEFAULT_LOCAL_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            invite_base_url: DEFAULT_INVITE_BASE_URL.to_string(),
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from `LETSHANG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(raw) = read(ENV_STORE) {
            config.store = StoreKind::parse(&raw).ok_or(ConfigError::InvalidStore(raw))?;
        }
        if let Some(raw) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(raw);
        }
        if let Some(raw) = read(ENV_LOCAL_PATH) {
            config.local_path = PathBuf::from(raw);
        }
        if let Some(raw) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(raw) = read(ENV_INVITE_BASE_URL) {
            config.invite_base_url = raw;
        }

        Ok(config)
    }
}
