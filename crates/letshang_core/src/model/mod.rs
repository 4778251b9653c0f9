//! Hang domain model.
//!
//! # Responsibility
//! - Define the canonical hang, attendee and suggestion records.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - A hang is addressed only by its `ShareCode`.
//! - Attendees and suggestions keep insertion order.
//! - Hangs are never deleted; only their attendees and suggestions change.

pub mod attendee;
pub mod hang;
pub mod suggestion;
