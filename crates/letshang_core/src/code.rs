//! Shareable hang codes.
//!
//! # Responsibility
//! - Generate short, human-shareable identifiers for new hangs.
//! - Normalize codes typed or pasted by invitees.
//!
//! # Invariants
//! - A code is exactly `CODE_LEN` characters from `[A-Z0-9]`.
//! - Randomness is the only uniqueness source; callers that own a store
//!   must go through `generate_unique` to rule out collisions.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed length of every share code.
pub const CODE_LEN: usize = 6;
/// Upper bound of generation attempts before `generate_unique` gives up.
pub const MAX_CODE_ATTEMPTS: usize = 16;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Six-character uppercase alphanumeric hang identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareCode(String);

/// Error returned for malformed codes or exhausted generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareCodeError {
    /// Input length differs from `CODE_LEN` after trimming.
    InvalidLength(usize),
    /// Input contains a character outside `[A-Za-z0-9]`.
    InvalidCharacter(char),
    /// Every attempt produced a code that was already taken.
    Exhausted { attempts: usize },
}

impl Display for ShareCodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLength(len) => {
                write!(f, "share code must be {CODE_LEN} characters, got {len}")
            }
            Self::InvalidCharacter(ch) => write!(f, "share code contains invalid character `{ch}`"),
            Self::Exhausted { attempts } => {
                write!(f, "no free share code found after {attempts} attempts")
            }
        }
    }
}

impl Error for ShareCodeError {}

impl ShareCode {
    /// Generates a random code from the thread RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generates a random code from a caller-provided RNG.
    pub fn generate_with<G: Rng>(rng: &mut G) -> Self {
        let code = (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect::<String>();
        Self(code)
    }

    /// Generates a code that `taken` reports as unused.
    ///
    /// `taken` is consulted once per candidate; it may return an error
    /// (e.g. a store lookup failure), which is propagated unchanged.
    pub fn generate_unique<E>(
        mut taken: impl FnMut(&ShareCode) -> Result<bool, E>,
    ) -> Result<Self, E>
    where
        E: From<ShareCodeError>,
    {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = Self::generate();
            if !taken(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(ShareCodeError::Exhausted {
            attempts: MAX_CODE_ATTEMPTS,
        }
        .into())
    }

    /// Parses user input: trims surrounding whitespace and uppercases.
    pub fn parse(raw: &str) -> Result<Self, ShareCodeError> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if len != CODE_LEN {
            return Err(ShareCodeError::InvalidLength(len));
        }
        if let Some(bad) = trimmed.chars().find(|ch| !ch.is_ascii_alphanumeric()) {
            return Err(ShareCodeError::InvalidCharacter(bad));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShareCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShareCode {
    type Error = ShareCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShareCode> for String {
    fn from(value: ShareCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::{ShareCode, ShareCodeError, CODE_LEN, MAX_CODE_ATTEMPTS};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_code_is_six_uppercase_alphanumerics() {
        for _ in 0..64 {
            let code = ShareCode::generate();
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert!(code
                .as_str()
                .chars()
                .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit()));
        }
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let first = ShareCode::generate_with(&mut StdRng::seed_from_u64(7));
        let second = ShareCode::generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let code = ShareCode::parse("  ab12cd ").unwrap();
        assert_eq!(code.as_str(), "AB12CD");
    }

    #[test]
    fn parse_rejects_wrong_length_and_symbols() {
        assert_eq!(
            ShareCode::parse("ABC").unwrap_err(),
            ShareCodeError::InvalidLength(3)
        );
        assert_eq!(
            ShareCode::parse("AB-12C").unwrap_err(),
            ShareCodeError::InvalidCharacter('-')
        );
    }

    #[test]
    fn generate_unique_retries_until_free() {
        let mut calls = 0;
        let code = ShareCode::generate_unique(|_| {
            calls += 1;
            Ok::<_, ShareCodeError>(calls < 3)
        })
        .unwrap();
        assert_eq!(calls, 3);
        assert_eq!(code.as_str().len(), CODE_LEN);
    }

    #[test]
    fn generate_unique_gives_up_when_everything_is_taken() {
        let err = ShareCode::generate_unique(|_| Ok::<_, ShareCodeError>(true)).unwrap_err();
        assert_eq!(
            err,
            ShareCodeError::Exhausted {
                attempts: MAX_CODE_ATTEMPTS
            }
        );
    }
}
