//! Persisted revocation ledger

use sqlx::SqlitePool;

use crate::utils::*;
use geonote::prelude::*;

pub(crate) async fn revoke(db: &SqlitePool, token_id: &str, expires_at: Timestamp) -> GnResult<()> {
	sqlx::query("INSERT OR IGNORE INTO revoked_tokens (token_id, expires_at) VALUES (?1, ?2)")
		.bind(token_id)
		.bind(expires_at.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	Ok(())
}

pub(crate) async fn is_revoked(db: &SqlitePool, token_id: &str) -> GnResult<bool> {
	sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token_id = ?1)")
		.bind(token_id)
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))
}

// vim: ts=4
