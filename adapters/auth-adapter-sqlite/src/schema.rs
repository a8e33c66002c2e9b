//! Database schema initialization

use sqlx::SqlitePool;

/// Initialize the database schema
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS vars (
		key text NOT NULL,
		value text NOT NULL,
		created_at INTEGER DEFAULT (unixepoch()),
		updated_at INTEGER DEFAULT (unixepoch()),
		PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Users
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
			id_tag text NOT NULL,
			email text,
			password text NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			updated_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(id_tag)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users (email)")
		.execute(&mut *tx)
		.await?;

	// Email verification codes, stored hashed
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS email_vfy (
			email text NOT NULL,
			code_hash text NOT NULL,
			expires_at INTEGER NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(email)
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_email_vfy_expires ON email_vfy (expires_at)")
		.execute(&mut *tx)
		.await?;

	// Revoked sessions, never purged
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS revoked_tokens (
			token_id text NOT NULL,
			expires_at INTEGER NOT NULL,
			created_at INTEGER DEFAULT (unixepoch()),
			PRIMARY KEY(token_id)
		)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
