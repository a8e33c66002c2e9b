//! Shared types, adapter traits, and core utilities for geonote.
//!
//! This crate contains the foundational types that are shared between the
//! service crates and all adapter implementations, so adapters never depend
//! on the HTTP-facing crates.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod abac;
pub mod auth_adapter;
pub mod error;
pub mod mailer;
pub mod note_adapter;
pub mod prelude;
pub mod types;
pub mod utils;
pub mod worker;

// vim: ts=4
