//! Read grants on private notes

use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::utils::*;
use geonote::prelude::*;

/// Keeps `IN (...)` lists well below SQLite's bound parameter limit
const MAX_IN_LIST: usize = 500;

pub(crate) async fn list(db: &SqlitePool, note_id: NoteId) -> GnResult<Vec<Box<str>>> {
	let rows = sqlx::query("SELECT grantee FROM note_grants WHERE note_id = ?1 ORDER BY grantee")
		.bind(note_id.0)
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.or(Err(Error::DbError))?;

	collect_res(rows.iter().map(|row| row.try_get::<String, _>("grantee").map(Into::into)))
}

pub(crate) async fn list_for(
	db: &SqlitePool,
	note_ids: &[NoteId],
) -> GnResult<HashMap<NoteId, Vec<Box<str>>>> {
	let mut grants: HashMap<NoteId, Vec<Box<str>>> = HashMap::new();

	for chunk in note_ids.chunks(MAX_IN_LIST) {
		let mut query =
			sqlx::QueryBuilder::new("SELECT note_id, grantee FROM note_grants WHERE note_id IN ");
		push_in(&mut query, chunk);
		query.push(" ORDER BY note_id, grantee");

		let rows = query
			.build()
			.fetch_all(db)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;
		let pairs = collect_res(rows.iter().map(|row| -> Result<(NoteId, String), sqlx::Error> {
			Ok((NoteId(row.try_get("note_id")?), row.try_get("grantee")?))
		}))?;

		for (note_id, grantee) in pairs {
			grants.entry(note_id).or_default().push(grantee.into());
		}
	}

	Ok(grants)
}

pub(crate) async fn add(db: &SqlitePool, note_id: NoteId, grantee: &str) -> GnResult<()> {
	let res = sqlx::query(
		"INSERT OR IGNORE INTO note_grants (note_id, grantee)
		SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM notes WHERE note_id = ?1)",
	)
	.bind(note_id.0)
	.bind(grantee)
	.execute(db)
	.await
	.inspect_err(inspect)
	.or(Err(Error::DbError))?;

	if res.rows_affected() == 0 {
		// Already granted, or the note is missing
		let exists =
			sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM notes WHERE note_id = ?1)")
				.bind(note_id.0)
				.fetch_one(db)
				.await
				.inspect_err(inspect)
				.or(Err(Error::DbError))?;
		if !exists {
			return Err(Error::NotFound);
		}
	}
	Ok(())
}

// vim: ts=4
