//! Flutter-facing bindings for Let's Hang core.

pub mod api;
