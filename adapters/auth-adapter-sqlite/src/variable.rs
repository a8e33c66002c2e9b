//! Global variable storage

use base64::Engine;
use rand::Rng;
use sqlx::{Row, SqlitePool};

use crate::utils::*;
use geonote::prelude::*;

const SESSION_SECRET_KEY: &str = "session_secret";

/// Read a variable
pub(crate) async fn read_var(db: &SqlitePool, key: &str) -> GnResult<Box<str>> {
	let res = sqlx::query("SELECT value FROM vars WHERE key = ?1").bind(key).fetch_one(db).await;

	map_res(res, |row| row.try_get::<String, _>("value").map(Into::into))
}

/// Read the session signing secret, generating it on first use
pub(crate) async fn ensure_session_secret(db: &SqlitePool) -> GnResult<Box<str>> {
	match read_var(db, SESSION_SECRET_KEY).await {
		Ok(secret) => return Ok(secret),
		Err(Error::NotFound) => {}
		Err(err) => return Err(err),
	}

	// 32 random bytes, base64 encoded
	let mut secret_bytes = [0u8; 32];
	rand::rng().fill_bytes(&mut secret_bytes);
	let secret = base64::engine::general_purpose::STANDARD.encode(secret_bytes);

	// Another instance may have won the race; whatever is stored is authoritative
	sqlx::query("INSERT OR IGNORE INTO vars (key, value) VALUES (?1, ?2)")
		.bind(SESSION_SECRET_KEY)
		.bind(&secret)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	info!("Generated new session secret");
	read_var(db, SESSION_SECRET_KEY).await
}

// vim: ts=4
