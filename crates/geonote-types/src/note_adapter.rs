//! Adapter that stores notes and their explicit read grants.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::{BoundingBox, Coords, Note, Visibility};

/// Data needed to insert a note
#[derive(Debug)]
pub struct CreateNoteData<'a> {
	pub text: &'a str,
	/// Ignored for replies: the adapter copies the parent's coordinates
	pub coords: Coords,
	pub owner: &'a str,
	pub visibility: Visibility,
	pub parent_id: Option<NoteId>,
	pub grantees: &'a [Box<str>],
}

/// Data to update an existing note
#[derive(Debug)]
pub struct UpdateNoteData<'a> {
	pub text: &'a str,
	pub coords: Option<Coords>,
}

/// A `geonote` note adapter (the note repository)
///
/// Implementations must apply each mutating call atomically:
/// - `create_note` without a parent fails with `Conflict` when another root note already
///   occupies the exact coordinates; the check and the insert are one atomic step.
/// - `create_note` with a parent re-reads the parent in the same transaction as the insert,
///   fails with `NotFound` if it vanished, and copies the parent's coordinates.
/// - note and grant inserts commit together or not at all.
/// - `hard_delete_note` removes the note and its grants only while it has no children.
#[async_trait]
pub trait NoteAdapter: Debug + Send + Sync {
	async fn read_note(&self, note_id: NoteId) -> GnResult<Note>;

	async fn create_note(&self, data: &CreateNoteData<'_>) -> GnResult<Note>;

	/// Updates text and (optionally) coordinates. Moving a note moves its whole thread.
	async fn update_note(&self, note_id: NoteId, data: &UpdateNoteData<'_>) -> GnResult<Note>;

	/// Replaces the text with `marker` and stamps the deletion time, keeping the row
	async fn soft_delete_note(&self, note_id: NoteId, marker: &str) -> GnResult<()>;

	/// Physically removes a childless note with its grants. Returns `false` (and changes
	/// nothing) when the note has children.
	async fn hard_delete_note(&self, note_id: NoteId) -> GnResult<bool>;

	async fn has_children(&self, note_id: NoteId) -> GnResult<bool>;

	async fn list_notes_by_owner(&self, owner: &str) -> GnResult<Vec<Note>>;

	/// Notes strictly inside the box, in storage order
	async fn list_notes_in_box(&self, bbox: &BoundingBox) -> GnResult<Vec<Note>>;

	async fn list_grants(&self, note_id: NoteId) -> GnResult<Vec<Box<str>>>;

	/// Grants for many notes in a single query. Notes without grants are absent from the map.
	async fn list_grants_for(
		&self,
		note_ids: &[NoteId],
	) -> GnResult<HashMap<NoteId, Vec<Box<str>>>>;

	/// Adds a read grant. Adding an existing grant is not an error.
	async fn add_grant(&self, note_id: NoteId, grantee: &str) -> GnResult<()>;
}

// vim: ts=4
