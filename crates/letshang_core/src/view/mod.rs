//! View-side state container.
//!
//! # Responsibility
//! - Hold UI-local state as an explicit value with pure transitions.
//! - Dispatch store-backed user actions through `HangService`.
//! - Build and parse invite links.
//!
//! # Invariants
//! - `state::reduce` is pure; only `controller` talks to the store.
//! - Store mutations are applied optimistically and reconciled with the
//!   store's record afterwards.

pub mod controller;
pub mod invite;
pub mod state;
