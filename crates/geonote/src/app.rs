//! App builder - constructs and runs the geonote application

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::auth_adapter::{AuthAdapter, RevocationLedger, SESSION_TOKEN_EXPIRY};
use crate::mailer::LogMailer;
use crate::note_adapter::NoteAdapter;
use crate::prelude::*;
use crate::{cleanup, routes};
pub use geonote_core::app::{App, AppBuilderOpts, AppState, VERSION};
use geonote_core::storage::DEFAULT_STORAGE_TIMEOUT;
use geonote_core::{GeoQueryEngine, MemoryRevocationLedger, NoteHierarchyManager, SessionAuthority};
use geonote_types::mailer::Mailer;
use geonote_types::worker;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	worker: Option<Arc<worker::WorkerPool>>,
	auth_adapter: Option<Arc<dyn AuthAdapter>>,
	note_adapter: Option<Arc<dyn NoteAdapter>>,
	revocation_ledger: Option<Arc<dyn RevocationLedger>>,
	mailer: Option<Arc<dyn Mailer>>,
	session_secret: Option<Box<str>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// A second builder in the same process keeps the first subscriber
		let _ignore = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts {
				listen: "127.0.0.1:8080".into(),
				dist_dir: PathBuf::from("./dist").into(),
				session_ttl: SESSION_TOKEN_EXPIRY,
				storage_timeout: DEFAULT_STORAGE_TIMEOUT,
				require_email_verification: false,
				login_failure_delay: Duration::from_secs(1),
			},
			worker: None,
			auth_adapter: None,
			note_adapter: None,
			revocation_ledger: None,
			mailer: None,
			session_secret: None,
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn dist_dir(&mut self, dist_dir: impl Into<Box<std::path::Path>>) -> &mut Self {
		self.opts.dist_dir = dist_dir.into();
		self
	}
	pub fn session_ttl(&mut self, seconds: i64) -> &mut Self {
		self.opts.session_ttl = seconds;
		self
	}
	pub fn storage_timeout(&mut self, timeout: Duration) -> &mut Self {
		self.opts.storage_timeout = timeout;
		self
	}
	pub fn require_email_verification(&mut self, require: bool) -> &mut Self {
		self.opts.require_email_verification = require;
		self
	}
	pub fn login_failure_delay(&mut self, delay: Duration) -> &mut Self {
		self.opts.login_failure_delay = delay;
		self
	}
	/// Overrides the signing secret stored by the auth adapter
	pub fn session_secret(&mut self, secret: impl Into<Box<str>>) -> &mut Self {
		self.session_secret = Some(secret.into());
		self
	}
	pub fn worker(&mut self, worker: Arc<worker::WorkerPool>) -> &mut Self {
		self.worker = Some(worker);
		self
	}

	// Adapters
	pub fn auth_adapter(&mut self, auth_adapter: Arc<dyn AuthAdapter>) -> &mut Self {
		self.auth_adapter = Some(auth_adapter);
		self
	}
	pub fn note_adapter(&mut self, note_adapter: Arc<dyn NoteAdapter>) -> &mut Self {
		self.note_adapter = Some(note_adapter);
		self
	}
	/// Where revoked sessions are recorded. Defaults to an in-memory ledger.
	pub fn revocation_ledger(&mut self, ledger: Arc<dyn RevocationLedger>) -> &mut Self {
		self.revocation_ledger = Some(ledger);
		self
	}
	/// Delivers verification codes. Defaults to writing them to the log.
	pub fn mailer(&mut self, mailer: Arc<dyn Mailer>) -> &mut Self {
		self.mailer = Some(mailer);
		self
	}

	/// Assembles the application state without binding a listener
	pub async fn build(self) -> GnResult<App> {
		let Some(worker) = self.worker else {
			error!("FATAL: No worker pool defined");
			return Err(Error::ConfigError("No worker pool defined".to_string()));
		};
		let Some(auth_adapter) = self.auth_adapter else {
			error!("FATAL: No auth adapter configured");
			return Err(Error::ConfigError("No auth adapter configured".to_string()));
		};
		let Some(note_adapter) = self.note_adapter else {
			error!("FATAL: No note adapter configured");
			return Err(Error::ConfigError("No note adapter configured".to_string()));
		};

		let ledger: Arc<dyn RevocationLedger> = match self.revocation_ledger {
			Some(ledger) => ledger,
			None => {
				warn!("No revocation ledger configured, revocations are lost on restart");
				Arc::new(MemoryRevocationLedger::new())
			}
		};
		let mailer: Arc<dyn Mailer> = match self.mailer {
			Some(mailer) => mailer,
			None => {
				info!("No mailer configured, verification codes are written to the log");
				Arc::new(LogMailer)
			}
		};

		let secret = match self.session_secret {
			Some(secret) => secret,
			None => auth_adapter.ensure_session_secret().await?,
		};
		let timeout = self.opts.storage_timeout;
		let sessions = SessionAuthority::new(secret.as_bytes(), self.opts.session_ttl, ledger)
			.map_err(|e| {
				error!("FATAL: Invalid session configuration: {}", e);
				e
			})?
			.with_storage_timeout(timeout);

		let app: App = Arc::new(AppState {
			opts: self.opts,
			worker,
			notes: NoteHierarchyManager::new(note_adapter.clone(), timeout),
			geo: GeoQueryEngine::new(note_adapter.clone(), timeout),
			auth_adapter,
			note_adapter,
			mailer,
			sessions,
		});

		Ok(app)
	}

	pub async fn run(self) -> GnResult<()> {
		info!("  __ _  ___  ___  _ __   ___ | |_ ___");
		info!(" / _` |/ _ \\/ _ \\| '_ \\ / _ \\| __/ _ \\");
		info!("| (_| |  __/ (_) | | | | (_) | ||  __/");
		info!(" \\__, |\\___|\\___/|_| |_|\\___/ \\__\\___|");
		info!(" |___/  V{}", VERSION);
		info!("");

		let app = self.build().await?;
		let router = routes::init(app.clone());

		cleanup::spawn(app.clone());

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
			e
		})?;
		info!("Listening on HTTP {}", app.opts.listen);
		axum::serve(listener, router).await?;

		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
