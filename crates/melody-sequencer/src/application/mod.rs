//! Application layer: host-facing driver and status queries.

pub mod driver;
pub mod query_handlers;
