//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the hang store contract shared by every persistence flavour.
//! - Isolate SQLite and snapshot-file details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Hang::validate()` before persistence.
//! - A write either applies fully or not at all.
//! - Repository APIs return semantic errors (`*NotFound`) in addition to
//!   transport errors; the service decides which of them are silent.

pub mod hang_repo;
pub mod local_store;
pub mod store;
