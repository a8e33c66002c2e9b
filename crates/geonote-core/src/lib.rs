//! Core of the geonote service.
//!
//! Session issuing and revocation, the note access policy, thread invariants and
//! bounding-box queries live here, together with the axum extractors and
//! middlewares that the handler crates share.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod abac;
pub mod app;
pub mod extract;
pub mod geo;
pub mod hierarchy;
pub mod ledger;
pub mod middleware;
pub mod prelude;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use abac::{AccessPolicyEvaluator, Actor, Decision, Intent};
pub use app::{App, AppBuilderOpts, AppState};
pub use extract::{Auth, OptionalAuth};
pub use geo::GeoQueryEngine;
pub use hierarchy::{DeleteOutcome, NewNote, NoteHierarchyManager};
pub use ledger::MemoryRevocationLedger;
pub use session::SessionAuthority;

// vim: ts=4
