//! Note subsystem. Geo-anchored notes, their reply threads and read grants.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod query;

mod prelude;

// vim: ts=4
