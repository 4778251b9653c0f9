//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into hang use-case APIs.
//! - Decide which store misses are silent no-ops and which surface.
//! - Keep view/FFI layers decoupled from storage details.

pub mod hang_service;
pub mod vote_session;
