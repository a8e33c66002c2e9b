//! Database schema initialization

use sqlx::SqlitePool;

/// Initialize the database schema
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Notes
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS notes (
			note_id integer PRIMARY KEY AUTOINCREMENT,
			text text NOT NULL,
			longitude real NOT NULL,
			latitude real NOT NULL,
			owner text NOT NULL,
			visibility char(1) NOT NULL,
			parent_id integer REFERENCES notes(note_id),
			created_at INTEGER NOT NULL DEFAULT (unixepoch()),
			updated_at INTEGER NOT NULL DEFAULT (unixepoch()),
			deleted_at INTEGER
		)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes (owner)")
		.execute(&mut *tx)
		.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_coords ON notes (longitude, latitude)")
		.execute(&mut *tx)
		.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_parent ON notes (parent_id)")
		.execute(&mut *tx)
		.await?;

	// Grants
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS note_grants (
			note_id integer NOT NULL REFERENCES notes(note_id) ON DELETE CASCADE,
			grantee text NOT NULL,
			created_at INTEGER NOT NULL DEFAULT (unixepoch()),
			PRIMARY KEY(note_id, grantee)
		)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
