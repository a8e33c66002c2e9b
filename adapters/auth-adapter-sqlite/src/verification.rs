//! Email verification codes

use sqlx::{SqliteConnection, SqlitePool};

use crate::utils::*;
use geonote::auth_adapter::VERIFICATION_CODE_EXPIRY;
use geonote::prelude::*;
use geonote::utils::{hash, random_code};

const CODE_HASH_PREFIX: &str = "v";

/// Create a verification code, replacing any earlier one for the address
pub(crate) async fn create(db: &SqlitePool, email: &str) -> GnResult<Box<str>> {
	let code = random_code();
	let expires_at = Timestamp::from_now(VERIFICATION_CODE_EXPIRY);

	sqlx::query(
		"INSERT OR REPLACE INTO email_vfy (email, code_hash, expires_at) VALUES (?1, ?2, ?3)",
	)
	.bind(email)
	.bind(hash(CODE_HASH_PREFIX, code.as_bytes()).as_ref())
	.bind(expires_at.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	info!("Verification code created for email: {}", email);
	Ok(code.into())
}

/// Consume a verification code. Lookup and removal are one statement, so a code
/// works once.
pub(crate) async fn consume(
	conn: &mut SqliteConnection,
	email: &str,
	code: &str,
) -> GnResult<()> {
	let res = sqlx::query(
		"DELETE FROM email_vfy WHERE email = ?1 AND code_hash = ?2 AND expires_at >= ?3",
	)
	.bind(email)
	.bind(hash(CODE_HASH_PREFIX, code.trim().as_bytes()).as_ref())
	.bind(Timestamp::now().0)
	.execute(conn)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 {
		return Err(Error::ValidationError("invalid or expired verification code".into()));
	}
	Ok(())
}

/// Clean up expired verification codes
pub(crate) async fn cleanup_expired(db: &SqlitePool) -> GnResult<u32> {
	let res = sqlx::query("DELETE FROM email_vfy WHERE expires_at < ?1")
		.bind(Timestamp::now().0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	Ok(res.rows_affected() as u32)
}

// vim: ts=4
