//! Flutter-facing bindings for Tenbin core.

pub mod api;
