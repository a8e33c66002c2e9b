//! Note storage

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::utils::*;
use geonote::note_adapter::{CreateNoteData, UpdateNoteData};
use geonote::prelude::*;
use geonote::types::{BoundingBox, Note};

pub(crate) async fn read(db: &SqlitePool, note_id: NoteId) -> GnResult<Note> {
	let res = sqlx::query(&format!("SELECT {} FROM notes WHERE note_id = ?1", NOTE_COLUMNS))
		.bind(note_id.0)
		.fetch_one(db)
		.await;

	map_res(res, note_from_row)
}

async fn insert_grants(
	tx: &mut Transaction<'_, Sqlite>,
	note_id: NoteId,
	grantees: &[Box<str>],
) -> GnResult<()> {
	for grantee in grantees {
		sqlx::query("INSERT OR IGNORE INTO note_grants (note_id, grantee) VALUES (?1, ?2)")
			.bind(note_id.0)
			.bind(grantee.as_ref())
			.execute(&mut **tx)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
	}
	Ok(())
}

/// Inserts a note with its grants in one transaction.
///
/// Roots are inserted only if no other root sits at the same coordinates. Replies
/// copy the parent's coordinates from the row read inside the insert itself.
pub(crate) async fn create(db: &SqlitePool, data: &CreateNoteData<'_>) -> GnResult<Note> {
	let now = Timestamp::now();
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	let row = if let Some(parent_id) = data.parent_id {
		sqlx::query(&format!(
			"INSERT INTO notes (text, longitude, latitude, owner, visibility, parent_id, created_at, updated_at)
			SELECT ?1, p.longitude, p.latitude, ?2, ?3, p.note_id, ?4, ?4
			FROM notes p WHERE p.note_id = ?5
			RETURNING {}",
			NOTE_COLUMNS
		))
		.bind(data.text)
		.bind(data.owner)
		.bind(data.visibility.code())
		.bind(now.0)
		.bind(parent_id.0)
		.fetch_optional(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?
		.ok_or(Error::NotFound)?
	} else {
		sqlx::query(&format!(
			"INSERT INTO notes (text, longitude, latitude, owner, visibility, parent_id, created_at, updated_at)
			SELECT ?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6
			WHERE NOT EXISTS (
				SELECT 1 FROM notes WHERE parent_id IS NULL AND longitude = ?2 AND latitude = ?3
			)
			RETURNING {}",
			NOTE_COLUMNS
		))
		.bind(data.text)
		.bind(data.coords.longitude)
		.bind(data.coords.latitude)
		.bind(data.owner)
		.bind(data.visibility.code())
		.bind(now.0)
		.fetch_optional(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?
		.ok_or_else(|| Error::Conflict("another note already exists at these coordinates".into()))?
	};
	let note = note_from_row(&row).inspect_err(inspect).or(Err(Error::DbError))?;

	insert_grants(&mut tx, note.note_id, data.grantees).await?;
	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;

	Ok(note)
}

pub(crate) async fn update(
	db: &SqlitePool,
	note_id: NoteId,
	data: &UpdateNoteData<'_>,
) -> GnResult<Note> {
	let now = Timestamp::now();
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	let res = sqlx::query("UPDATE notes SET text = ?2, updated_at = ?3 WHERE note_id = ?1")
		.bind(note_id.0)
		.bind(data.text)
		.bind(now.0)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	if let Some(coords) = data.coords {
		// The whole thread follows its root
		sqlx::query(
			"WITH RECURSIVE thread(note_id) AS (
				SELECT ?1
				UNION ALL
				SELECT n.note_id FROM notes n JOIN thread t ON n.parent_id = t.note_id
			)
			UPDATE notes SET longitude = ?2, latitude = ?3
			WHERE note_id IN (SELECT note_id FROM thread)",
		)
		.bind(note_id.0)
		.bind(coords.longitude)
		.bind(coords.latitude)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;
	}

	let res = sqlx::query(&format!("SELECT {} FROM notes WHERE note_id = ?1", NOTE_COLUMNS))
		.bind(note_id.0)
		.fetch_one(&mut *tx)
		.await;
	let note = map_res(res, note_from_row)?;

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	Ok(note)
}

pub(crate) async fn soft_delete(db: &SqlitePool, note_id: NoteId, marker: &str) -> GnResult<()> {
	let now = Timestamp::now();
	let res = sqlx::query(
		"UPDATE notes SET text = ?2, updated_at = ?3, deleted_at = coalesce(deleted_at, ?3)
		WHERE note_id = ?1",
	)
	.bind(note_id.0)
	.bind(marker)
	.bind(now.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

/// Removes a note and its grants unless it has replies
pub(crate) async fn hard_delete(db: &SqlitePool, note_id: NoteId) -> GnResult<bool> {
	let mut tx = db.begin().await.inspect_err(inspect).or(Err(Error::DbError))?;

	sqlx::query(
		"DELETE FROM note_grants WHERE note_id = ?1
		AND NOT EXISTS (SELECT 1 FROM notes WHERE parent_id = ?1)",
	)
	.bind(note_id.0)
	.execute(&mut *tx)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	let res = sqlx::query(
		"DELETE FROM notes WHERE note_id = ?1
		AND NOT EXISTS (SELECT 1 FROM notes WHERE parent_id = ?1)",
	)
	.bind(note_id.0)
	.execute(&mut *tx)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 {
		// Either missing or it has replies; nothing was changed
		tx.rollback().await.inspect_err(inspect).or(Err(Error::DbError))?;
		read(db, note_id).await?;
		return Ok(false);
	}

	tx.commit().await.inspect_err(inspect).or(Err(Error::DbError))?;
	Ok(true)
}

pub(crate) async fn has_children(db: &SqlitePool, note_id: NoteId) -> GnResult<bool> {
	sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM notes WHERE parent_id = ?1)")
		.bind(note_id.0)
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))
}

pub(crate) async fn list_by_owner(db: &SqlitePool, owner: &str) -> GnResult<Vec<Note>> {
	let rows = sqlx::query(&format!(
		"SELECT {} FROM notes WHERE owner = ?1 ORDER BY note_id",
		NOTE_COLUMNS
	))
	.bind(owner)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	collect_res(rows.iter().map(note_from_row))
}

pub(crate) async fn list_in_box(db: &SqlitePool, bbox: &BoundingBox) -> GnResult<Vec<Note>> {
	let rows = sqlx::query(&format!(
		"SELECT {} FROM notes
		WHERE longitude > ?1 AND longitude < ?2 AND latitude > ?3 AND latitude < ?4
		ORDER BY note_id",
		NOTE_COLUMNS
	))
	.bind(bbox.lower_longitude)
	.bind(bbox.upper_longitude)
	.bind(bbox.lower_latitude)
	.bind(bbox.upper_latitude)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	collect_res(rows.iter().map(note_from_row))
}

// vim: ts=4
