//! Note threads: creation, updates and deletion under the hierarchy invariants.
//!
//! - a reply sits at its parent's coordinates, now and after later moves
//! - a reply to a public note is public; a reply to a private note is private and is
//!   shared with a snapshot of the parent's grantees
//! - only root notes compete for a coordinate pair
//! - a note with replies is redacted instead of removed

use std::sync::Arc;
use std::time::Duration;

use geonote_types::note_adapter::{CreateNoteData, NoteAdapter, UpdateNoteData};
use geonote_types::types::{Coords, Note, NoteView, REDACTED_TEXT, Visibility};

use crate::abac::{AccessPolicyEvaluator, Actor, Decision, Intent, needs_grants};
use crate::prelude::*;
use crate::storage::bounded;

/// Longest accepted note text, in characters
pub const MAX_TEXT_LENGTH: usize = 4096;

/// A note to be created
#[derive(Debug)]
pub struct NewNote<'a> {
	pub text: &'a str,
	/// Required for root notes, ignored for replies
	pub coords: Option<Coords>,
	pub visibility: Visibility,
	pub grantees: &'a [Box<str>],
	pub parent_id: Option<NoteId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
	/// Replies exist: the text was replaced with the redaction marker
	Redacted,
	/// The note and its grants are gone
	Removed,
}

#[derive(Debug)]
pub struct NoteHierarchyManager {
	notes: Arc<dyn NoteAdapter>,
	evaluator: AccessPolicyEvaluator,
	timeout: Duration,
}

fn validate_text(text: &str) -> GnResult<()> {
	if text.trim().is_empty() {
		return Err(Error::ValidationError("note text cannot be empty".into()));
	}
	if text.chars().count() > MAX_TEXT_LENGTH {
		return Err(Error::ValidationError(format!(
			"note text must be at most {} characters",
			MAX_TEXT_LENGTH
		)));
	}
	Ok(())
}

impl NoteHierarchyManager {
	pub fn new(notes: Arc<dyn NoteAdapter>, timeout: Duration) -> Self {
		Self { notes, evaluator: AccessPolicyEvaluator::new(), timeout }
	}

	async fn read_note(&self, note_id: NoteId) -> GnResult<Option<Note>> {
		match bounded(self.timeout, "read_note", self.notes.read_note(note_id)).await {
			Ok(note) => Ok(Some(note)),
			Err(Error::NotFound) => Ok(None),
			Err(err) => Err(err),
		}
	}

	async fn grants(&self, note_id: NoteId) -> GnResult<Vec<Box<str>>> {
		bounded(self.timeout, "list_grants", self.notes.list_grants(note_id)).await
	}

	/// Decides `intent` on a loaded note, fetching grants only when they matter
	async fn decide(&self, actor: Actor<'_>, note: &Note, intent: Intent) -> GnResult<Decision> {
		let grants = if needs_grants(actor, note, intent) {
			self.grants(note.note_id).await?
		} else {
			Vec::new()
		};
		Ok(self.evaluator.decide_note(actor, Some((note, grants.as_slice())), intent))
	}

	/// Loads a note the actor may read. Denied notes look missing.
	async fn readable(&self, actor: Actor<'_>, note_id: NoteId) -> GnResult<Note> {
		let Some(note) = self.read_note(note_id).await? else {
			return Err(Error::NotFound);
		};
		match self.decide(actor, &note, Intent::Read).await? {
			Decision::Allow => Ok(note),
			Decision::Deny | Decision::NotFound => Err(Error::NotFound),
		}
	}

	/// Loads a note the actor owns.
	///
	/// Non-owners who can read the note get `PermissionDenied`, everyone else `NotFound`.
	async fn writable(&self, actor: Actor<'_>, note_id: NoteId) -> GnResult<Note> {
		let Some(note) = self.read_note(note_id).await? else {
			return Err(Error::NotFound);
		};
		match self.decide(actor, &note, Intent::Write).await? {
			Decision::Allow => Ok(note),
			Decision::NotFound => Err(Error::NotFound),
			Decision::Deny => {
				if self.decide(actor, &note, Intent::Read).await? == Decision::Allow {
					warn!(subject = %actor, note_id = %note_id, "Write denied on readable note");
					Err(Error::PermissionDenied)
				} else {
					Err(Error::NotFound)
				}
			}
		}
	}

	/// Outward view; the grant list is only disclosed to the owner
	async fn view(&self, actor: Actor<'_>, note: Note) -> GnResult<NoteView> {
		let grantees = if actor.is_owner_of(&note) && note.visibility == Visibility::Private {
			Some(self.grants(note.note_id).await?)
		} else {
			None
		};
		Ok(NoteView::new(note, grantees))
	}

	pub async fn get(&self, actor: Actor<'_>, note_id: NoteId) -> GnResult<NoteView> {
		let note = self.readable(actor, note_id).await?;
		self.view(actor, note).await
	}

	pub async fn create(&self, owner: &str, new: &NewNote<'_>) -> GnResult<NoteView> {
		validate_text(new.text)?;
		let actor = Actor::Principal(owner);

		let data = if let Some(parent_id) = new.parent_id {
			// Replying requires seeing the parent
			let parent = self.readable(actor, parent_id).await?;
			let grantees = match parent.visibility {
				Visibility::Public => Vec::new(),
				Visibility::Private => self.grants(parent_id).await?,
			};
			if new.visibility != parent.visibility || !new.grantees.is_empty() {
				debug!(
					owner = owner,
					parent_id = %parent_id,
					visibility = parent.visibility.as_str(),
					"Reply visibility and audience inherited from parent"
				);
			}
			(parent.visibility, grantees, parent.coords, Some(parent_id))
		} else {
			let coords = new
				.coords
				.ok_or_else(|| Error::ValidationError("coordinates are required".into()))?;
			coords.validate()?;
			let grantees = match new.visibility {
				Visibility::Public => Vec::new(),
				Visibility::Private => {
					let mut grantees: Vec<Box<str>> =
						new.grantees.iter().filter(|g| g.as_ref() != owner).cloned().collect();
					grantees.sort();
					grantees.dedup();
					grantees
				}
			};
			(new.visibility, grantees, coords, None)
		};
		let (visibility, grantees, coords, parent_id) = data;

		let note = bounded(
			self.timeout,
			"create_note",
			self.notes.create_note(&CreateNoteData {
				text: new.text,
				coords,
				owner,
				visibility,
				parent_id,
				grantees: &grantees,
			}),
		)
		.await?;
		info!(owner = owner, note_id = %note.note_id, parent_id = ?note.parent_id.map(|id| id.0), "Note created");

		Ok(NoteView::new(note, (visibility == Visibility::Private).then_some(grantees)))
	}

	/// Changes text and, for root notes, position. A reply keeps its parent's position
	/// whatever coordinates are supplied; moving a root moves its thread.
	pub async fn update(
		&self,
		actor: &str,
		note_id: NoteId,
		text: &str,
		coords: Option<Coords>,
	) -> GnResult<NoteView> {
		validate_text(text)?;
		let actor = Actor::Principal(actor);
		let note = self.writable(actor, note_id).await?;

		let coords = if note.is_root() {
			if let Some(coords) = coords {
				coords.validate()?;
			}
			coords
		} else {
			if coords.is_some() {
				debug!(note_id = %note_id, "Ignoring coordinates supplied for a reply");
			}
			None
		};

		let note = bounded(
			self.timeout,
			"update_note",
			self.notes.update_note(note_id, &UpdateNoteData { text, coords }),
		)
		.await?;
		info!(subject = %actor, note_id = %note_id, "Note updated");
		self.view(actor, note).await
	}

	pub async fn delete(&self, actor: &str, note_id: NoteId) -> GnResult<DeleteOutcome> {
		let actor = Actor::Principal(actor);
		self.writable(actor, note_id).await?;

		let has_children =
			bounded(self.timeout, "has_children", self.notes.has_children(note_id)).await?;
		if !has_children
			&& bounded(self.timeout, "hard_delete_note", self.notes.hard_delete_note(note_id))
				.await?
		{
			info!(subject = %actor, note_id = %note_id, "Note removed");
			return Ok(DeleteOutcome::Removed);
		}

		// A reply exists (possibly created after the check above)
		bounded(
			self.timeout,
			"soft_delete_note",
			self.notes.soft_delete_note(note_id, REDACTED_TEXT),
		)
		.await?;
		info!(subject = %actor, note_id = %note_id, "Note redacted, replies keep the thread");
		Ok(DeleteOutcome::Redacted)
	}
}


// vim: ts=4
