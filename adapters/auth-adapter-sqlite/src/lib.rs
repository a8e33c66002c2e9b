//! SQLite auth adapter for geonote.
//!
//! Holds password hashes, pending email verification codes, revoked session ids and
//! the session signing secret. Doubles as the persisted revocation ledger.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod crypto;
mod revocation;
mod schema;
mod user;
mod utils;
mod variable;
mod verification;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::{path::Path, sync::Arc, time::Duration};

use geonote::auth_adapter::{self, CreateUserData};
use geonote::prelude::*;
use geonote::worker::WorkerPool;

use crate::schema::init_db;

#[derive(Debug)]
pub struct AuthAdapterSqlite {
	db: SqlitePool,
	worker: Arc<WorkerPool>,
}

impl AuthAdapterSqlite {
	pub async fn new(worker: Arc<WorkerPool>, path: impl AsRef<Path>) -> GnResult<Self> {
		let path = path.as_ref();
		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.busy_timeout(Duration::from_secs(5))
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		Ok(Self { db, worker })
	}
}

#[async_trait]
impl auth_adapter::AuthAdapter for AuthAdapterSqlite {
	async fn create_user(&self, data: CreateUserData<'_>) -> GnResult<()> {
		user::create(&self.db, &self.worker, data).await
	}

	async fn user_exists(&self, id_tag: &str) -> GnResult<bool> {
		user::exists(&self.db, id_tag).await
	}

	async fn check_password(&self, id_tag: &str, password: &str) -> GnResult<()> {
		user::check_password(&self.db, &self.worker, id_tag, password).await
	}

	async fn create_verification_code(&self, email: &str) -> GnResult<Box<str>> {
		verification::create(&self.db, email).await
	}

	async fn cleanup_expired_verification_codes(&self) -> GnResult<u32> {
		verification::cleanup_expired(&self.db).await
	}

	async fn ensure_session_secret(&self) -> GnResult<Box<str>> {
		variable::ensure_session_secret(&self.db).await
	}
}

#[async_trait]
impl auth_adapter::RevocationLedger for AuthAdapterSqlite {
	async fn revoke(&self, token_id: &str, expires_at: Timestamp) -> GnResult<()> {
		revocation::revoke(&self.db, token_id, expires_at).await
	}

	async fn is_revoked(&self, token_id: &str) -> GnResult<bool> {
		revocation::is_revoked(&self.db, token_id).await
	}
}

// vim: ts=4
