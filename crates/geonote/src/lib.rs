//! geonote is a small self-hosted service for geo-anchored notes.
//!
//! # Features
//!
//! - Notes pinned to a coordinate pair, one root note per location
//! - Reply threads that inherit position and audience from their parent
//! - Public notes, and private notes shared with explicit grantees
//! - Bounding-box queries filtered by what the caller may read
//! - Revocable session tokens (Bearer header or cookie)
//! - Email verification codes on registration

// Re-export shared types and adapter traits from geonote-types
pub use geonote_types::auth_adapter;
pub use geonote_types::error;
pub use geonote_types::note_adapter;
pub use geonote_types::types;
pub use geonote_types::worker;

// Feature crate re-exports
pub use geonote_auth as auth;
pub use geonote_note as note;

// Local modules
pub mod app;
pub mod cleanup;
pub mod mailer;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
