//! Boundary schema for `GET /contacts/{id}/lastseen/changes`
//!
//! The data source returns a list of `{captured_at, last_seen_at}` records
//! with RFC 3339 timestamps. Ordering is not guaranteed by contract.

mod raw_event;
mod adapter;

pub use raw_event::*;
pub use adapter::*;
