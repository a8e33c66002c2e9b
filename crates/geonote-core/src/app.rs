//! App state type

use std::{path::Path, sync::Arc, time::Duration};

use geonote_types::auth_adapter::AuthAdapter;
use geonote_types::mailer::Mailer;
use geonote_types::note_adapter::NoteAdapter;
use geonote_types::worker::WorkerPool;

use crate::geo::GeoQueryEngine;
use crate::hierarchy::NoteHierarchyManager;
use crate::session::SessionAuthority;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub worker: Arc<WorkerPool>,

	pub auth_adapter: Arc<dyn AuthAdapter>,
	pub note_adapter: Arc<dyn NoteAdapter>,
	pub mailer: Arc<dyn Mailer>,

	pub sessions: SessionAuthority,
	pub notes: NoteHierarchyManager,
	pub geo: GeoQueryEngine,
}

pub type App = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	pub dist_dir: Box<Path>,
	/// Session lifetime in seconds
	pub session_ttl: i64,
	/// Upper bound for every note storage call
	pub storage_timeout: Duration,
	pub require_email_verification: bool,
	/// How long a failed login waits before answering
	pub login_failure_delay: Duration,
}

// vim: ts=4
