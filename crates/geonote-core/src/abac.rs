//! Access policy for notes
//!
//! Owner / explicit grantee / public model:
//! - Subject: the caller, authenticated or anonymous (`Actor`)
//! - Intent: read or write
//! - Object: a note with its grant list (implements `AttrSet`)

use geonote_types::abac::AttrSet;
use geonote_types::auth_adapter::AuthCtx;
use geonote_types::types::{Note, Visibility};

use crate::prelude::*;

/// The caller of an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor<'a> {
	Anonymous,
	Principal(&'a str),
}

impl<'a> Actor<'a> {
	pub fn id_tag(self) -> Option<&'a str> {
		match self {
			Actor::Anonymous => None,
			Actor::Principal(id_tag) => Some(id_tag),
		}
	}

	pub fn is_authenticated(self) -> bool {
		matches!(self, Actor::Principal(_))
	}

	pub fn is_owner_of(self, note: &Note) -> bool {
		self.id_tag() == Some(note.owner.as_ref())
	}
}

impl<'a> From<Option<&'a AuthCtx>> for Actor<'a> {
	fn from(auth: Option<&'a AuthCtx>) -> Self {
		auth.map_or(Actor::Anonymous, |auth| Actor::Principal(&auth.id_tag))
	}
}

impl<'a> From<&'a AuthCtx> for Actor<'a> {
	fn from(auth: &'a AuthCtx) -> Self {
		Actor::Principal(&auth.id_tag)
	}
}

impl std::fmt::Display for Actor<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.id_tag().unwrap_or("<anonymous>"))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
	Read,
	Write,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
	Allow,
	Deny,
	NotFound,
}

/// Attribute view of a note for policy decisions
pub struct NoteAttrs<'a> {
	note: &'a Note,
	grantees: &'a [Box<str>],
}

impl<'a> NoteAttrs<'a> {
	pub fn new(note: &'a Note, grantees: &'a [Box<str>]) -> Self {
		Self { note, grantees }
	}
}

impl AttrSet for NoteAttrs<'_> {
	fn get(&self, key: &str) -> Option<&str> {
		match key {
			"owner_id_tag" => Some(&self.note.owner),
			"visibility" => Some(self.note.visibility.as_str()),
			_ => None,
		}
	}

	fn get_list(&self, key: &str) -> Option<Vec<&str>> {
		match key {
			"grantee" => Some(self.grantees.iter().map(AsRef::as_ref).collect()),
			_ => None,
		}
	}
}

/// Whether deciding `intent` on `note` for `actor` depends on the note's grant list
pub fn needs_grants(actor: Actor<'_>, note: &Note, intent: Intent) -> bool {
	intent == Intent::Read
		&& note.visibility == Visibility::Private
		&& actor.is_authenticated()
		&& !actor.is_owner_of(note)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AccessPolicyEvaluator;

impl AccessPolicyEvaluator {
	pub fn new() -> Self {
		Self
	}

	/// Decides whether `actor` may perform `intent` on `object` (`None` if the note does
	/// not exist). Ownership dominates: grants only ever confer read access.
	pub fn decide(&self, actor: Actor<'_>, object: Option<&dyn AttrSet>, intent: Intent) -> Decision {
		let Some(object) = object else {
			debug!(subject = %actor, ?intent, "Note does not exist");
			return Decision::NotFound;
		};
		let owner = object.get("owner_id_tag").unwrap_or_default();
		let is_owner = actor.id_tag() == Some(owner);

		if intent == Intent::Write {
			if is_owner {
				debug!(subject = %actor, owner = owner, "Owner access allowed for write");
				return Decision::Allow;
			}
			debug!(subject = %actor, owner = owner, "Non-owner denied for write");
			return Decision::Deny;
		}

		match object.get("visibility") {
			Some("public") => {
				debug!(subject = %actor, visibility = "public", "Public visibility allows read");
				Decision::Allow
			}
			Some("private") => {
				let Some(id_tag) = actor.id_tag() else {
					debug!(visibility = "private", owner = owner, "Anonymous denied private read");
					return Decision::Deny;
				};
				let is_grantee = object.contains("grantee", id_tag);
				if is_owner || is_grantee {
					debug!(subject = id_tag, visibility = "private", is_owner = is_owner, is_grantee = is_grantee, "Private read allowed");
					Decision::Allow
				} else {
					debug!(subject = id_tag, visibility = "private", owner = owner, "Not owner or grantee - denied");
					Decision::Deny
				}
			}
			other => {
				debug!(subject = %actor, visibility = ?other, "Unknown visibility level - denied");
				Decision::Deny
			}
		}
	}

	/// Convenience form taking the note and its grants directly
	pub fn decide_note(
		&self,
		actor: Actor<'_>,
		note: Option<(&Note, &[Box<str>])>,
		intent: Intent,
	) -> Decision {
		match note {
			Some((note, grantees)) => {
				let attrs = NoteAttrs::new(note, grantees);
				self.decide(actor, Some(&attrs), intent)
			}
			None => self.decide(actor, None, intent),
		}
	}
}


// vim: ts=4
