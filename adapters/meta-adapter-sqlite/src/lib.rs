//! SQLite note adapter for geonote.
//!
//! Stores notes, their reply threads and explicit read grants.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

mod grant;
mod note;
mod schema;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::{collections::HashMap, path::Path, time::Duration};

use geonote::note_adapter::{self, CreateNoteData, UpdateNoteData};
use geonote::prelude::*;
use geonote::types::{BoundingBox, Note};

use crate::schema::init_db;

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>) -> GnResult<Self> {
		let path = path.as_ref();
		if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path)
			.create_if_missing(true)
			.foreign_keys(true)
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

		Ok(Self { db })
	}
}

#[async_trait]
impl note_adapter::NoteAdapter for MetaAdapterSqlite {
	async fn read_note(&self, note_id: NoteId) -> GnResult<Note> {
		note::read(&self.db, note_id).await
	}

	async fn create_note(&self, data: &CreateNoteData<'_>) -> GnResult<Note> {
		note::create(&self.db, data).await
	}

	async fn update_note(&self, note_id: NoteId, data: &UpdateNoteData<'_>) -> GnResult<Note> {
		note::update(&self.db, note_id, data).await
	}

	async fn soft_delete_note(&self, note_id: NoteId, marker: &str) -> GnResult<()> {
		note::soft_delete(&self.db, note_id, marker).await
	}

	async fn hard_delete_note(&self, note_id: NoteId) -> GnResult<bool> {
		note::hard_delete(&self.db, note_id).await
	}

	async fn has_children(&self, note_id: NoteId) -> GnResult<bool> {
		note::has_children(&self.db, note_id).await
	}

	async fn list_notes_by_owner(&self, owner: &str) -> GnResult<Vec<Note>> {
		note::list_by_owner(&self.db, owner).await
	}

	async fn list_notes_in_box(&self, bbox: &BoundingBox) -> GnResult<Vec<Note>> {
		note::list_in_box(&self.db, bbox).await
	}

	async fn list_grants(&self, note_id: NoteId) -> GnResult<Vec<Box<str>>> {
		grant::list(&self.db, note_id).await
	}

	async fn list_grants_for(
		&self,
		note_ids: &[NoteId],
	) -> GnResult<HashMap<NoteId, Vec<Box<str>>>> {
		grant::list_for(&self.db, note_ids).await
	}

	async fn add_grant(&self, note_id: NoteId, grantee: &str) -> GnResult<()> {
		grant::add(&self.db, note_id, grantee).await
	}
}

// vim: ts=4
