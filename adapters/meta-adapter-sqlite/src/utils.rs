//! Utility functions for database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use geonote::prelude::*;
use geonote::types::{Coords, Note, Visibility};

/// Column list matching `note_from_row`
pub(crate) const NOTE_COLUMNS: &str =
	"note_id, text, longitude, latitude, owner, visibility, parent_id, created_at, updated_at, deleted_at";

/// Log database errors
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map a query result to a value using a closure
pub(crate) fn map_res<T, F>(row: Result<SqliteRow, sqlx::Error>, f: F) -> GnResult<T>
where
	F: FnOnce(&SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(ref row) => f(row).inspect_err(inspect).map_err(|_| Error::DbError),
		Err(sqlx::Error::RowNotFound) => Err(Error::NotFound),
		Err(err) => {
			inspect(&err);
			Err(Error::DbError)
		}
	}
}

/// Collect result iterator into a vector
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>> + Unpin,
) -> GnResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.inspect_err(inspect).map_err(|_| Error::DbError)?);
	}
	Ok(items)
}

/// Push a parenthesized, comma separated list of bound ids
pub(crate) fn push_in(query: &mut QueryBuilder<'_, Sqlite>, values: &[NoteId]) {
	query.push("(");
	let mut separated = query.separated(", ");
	for value in values {
		separated.push_bind(value.0);
	}
	separated.push_unseparated(")");
}

pub(crate) fn note_from_row(row: &SqliteRow) -> Result<Note, sqlx::Error> {
	let visibility: String = row.try_get("visibility")?;
	let visibility = Visibility::from_code(&visibility)
		.map_err(|_| sqlx::Error::Decode(format!("invalid visibility code: {}", visibility).into()))?;

	Ok(Note {
		note_id: NoteId(row.try_get("note_id")?),
		text: row.try_get::<String, _>("text")?.into(),
		coords: Coords::new(row.try_get("longitude")?, row.try_get("latitude")?),
		owner: row.try_get::<String, _>("owner")?.into(),
		visibility,
		parent_id: row.try_get::<Option<i64>, _>("parent_id")?.map(NoteId),
		created_at: Timestamp(row.try_get("created_at")?),
		updated_at: Timestamp(row.try_get("updated_at")?),
		deleted_at: row.try_get::<Option<i64>, _>("deleted_at")?.map(Timestamp),
	})
}

// vim: ts=4
