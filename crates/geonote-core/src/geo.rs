//! Bounding-box and per-owner note queries, filtered by the access policy

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use geonote_types::note_adapter::NoteAdapter;
use geonote_types::types::{BoundingBox, Note, NoteView, Visibility};

use crate::abac::{AccessPolicyEvaluator, Actor, Decision, Intent};
use crate::prelude::*;
use crate::storage::bounded;

#[derive(Debug)]
pub struct GeoQueryEngine {
	notes: Arc<dyn NoteAdapter>,
	evaluator: AccessPolicyEvaluator,
	timeout: Duration,
}

impl GeoQueryEngine {
	pub fn new(notes: Arc<dyn NoteAdapter>, timeout: Duration) -> Self {
		Self { notes, evaluator: AccessPolicyEvaluator::new(), timeout }
	}

	/// Notes strictly inside `bbox` that `actor` may read, in storage order
	pub async fn query_box(&self, actor: Actor<'_>, bbox: &BoundingBox) -> GnResult<Vec<NoteView>> {
		bbox.validate()?;
		let mut candidates =
			bounded(self.timeout, "list_notes_in_box", self.notes.list_notes_in_box(bbox)).await?;
		// Adapters may answer from a coarser index; the edges stay exclusive here
		candidates.retain(|note| bbox.contains(note.coords));
		self.filter(actor, candidates).await
	}

	/// Notes of `owner` that `actor` may read, in storage order
	pub async fn query_by_owner(&self, actor: Actor<'_>, owner: &str) -> GnResult<Vec<NoteView>> {
		let candidates =
			bounded(self.timeout, "list_notes_by_owner", self.notes.list_notes_by_owner(owner))
				.await?;
		self.filter(actor, candidates).await
	}

	async fn filter(&self, actor: Actor<'_>, candidates: Vec<Note>) -> GnResult<Vec<NoteView>> {
		// Anonymous callers only ever see public notes, so grants are not needed.
		// Otherwise one batch covers both authorization and the owner's grant lists.
		let mut grants: HashMap<NoteId, Vec<Box<str>>> = if actor.is_authenticated() {
			let private: Vec<NoteId> = candidates
				.iter()
				.filter(|note| note.visibility == Visibility::Private)
				.map(|note| note.note_id)
				.collect();
			if private.is_empty() {
				HashMap::new()
			} else {
				bounded(self.timeout, "list_grants_for", self.notes.list_grants_for(&private)).await?
			}
		} else {
			HashMap::new()
		};

		let total = candidates.len();
		let mut views = Vec::with_capacity(total);
		for note in candidates {
			let note_grants = grants.remove(&note.note_id).unwrap_or_default();
			let decision =
				self.evaluator.decide_note(actor, Some((&note, note_grants.as_slice())), Intent::Read);
			if decision != Decision::Allow {
				continue;
			}
			let disclosed = (actor.is_owner_of(&note) && note.visibility == Visibility::Private)
				.then_some(note_grants);
			views.push(NoteView::new(note, disclosed));
		}
		debug!(subject = %actor, candidates = total, visible = views.len(), "Filtered note query");

		Ok(views)
	}
}

// vim: ts=4
