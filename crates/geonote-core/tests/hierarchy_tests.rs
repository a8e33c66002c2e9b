//! Thread invariants and access rules of the note hierarchy manager, against the
//! SQLite note adapter.

use geonote_core::{DeleteOutcome, NewNote, NoteHierarchyManager};
use geonote_core::abac::Actor;
use geonote_meta_adapter_sqlite::MetaAdapterSqlite;
use geonote_types::note_adapter::NoteAdapter;
use geonote_types::prelude::*;
use geonote_types::types::{Coords, REDACTED_TEXT, Visibility};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn create_manager() -> (NoteHierarchyManager, Arc<MetaAdapterSqlite>, TempDir) {
	let tmp_dir = TempDir::new().unwrap();
	let adapter = Arc::new(MetaAdapterSqlite::new(tmp_dir.path().join("notes.db")).await.unwrap());
	let manager = NoteHierarchyManager::new(adapter.clone(), Duration::from_secs(5));
	(manager, adapter, tmp_dir)
}

fn grantees(names: &[&str]) -> Vec<Box<str>> {
	names.iter().map(|n| Box::<str>::from(*n)).collect()
}

fn root_note<'a>(
	text: &'a str,
	coords: Coords,
	visibility: Visibility,
	grantees: &'a [Box<str>],
) -> NewNote<'a> {
	NewNote { text, coords: Some(coords), visibility, grantees, parent_id: None }
}

fn reply<'a>(
	text: &'a str,
	parent_id: NoteId,
	visibility: Visibility,
	grantees: &'a [Box<str>],
) -> NewNote<'a> {
	NewNote { text, coords: None, visibility, grantees, parent_id: Some(parent_id) }
}

const ALICE: Actor<'static> = Actor::Principal("alice");
const BOB: Actor<'static> = Actor::Principal("bob");
const CAROL: Actor<'static> = Actor::Principal("carol");

#[tokio::test]
async fn test_private_note_scenario() {
	let (manager, _adapter, _tmp) = create_manager().await;
	let bob_only = grantees(&["bob"]);

	let note = manager
		.create(
			"alice",
			&root_note("secret", Coords::new(10.0, 20.0), Visibility::Private, &bob_only),
		)
		.await
		.unwrap();
	assert_eq!(note.grantees.as_deref(), Some(bob_only.as_slice()));

	// reads
	let read = manager.get(BOB, note.id).await.unwrap();
	assert_eq!(read.text.as_ref(), "secret");
	assert!(read.grantees.is_none(), "grantees are only shown to the owner");
	assert!(matches!(manager.get(CAROL, note.id).await, Err(Error::NotFound)));
	assert!(matches!(manager.get(Actor::Anonymous, note.id).await, Err(Error::NotFound)));
	let own = manager.get(ALICE, note.id).await.unwrap();
	assert_eq!(own.grantees.as_deref(), Some(bob_only.as_slice()));

	// writes
	let res = manager.update("bob", note.id, "hacked", None).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));
	let res = manager.update("carol", note.id, "hacked", None).await;
	assert!(matches!(res, Err(Error::NotFound)));
	let res = manager.delete("bob", note.id).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));

	let updated = manager.update("alice", note.id, "still secret", None).await.unwrap();
	assert_eq!(updated.text.as_ref(), "still secret");

	assert_eq!(manager.delete("alice", note.id).await.unwrap(), DeleteOutcome::Removed);
	assert!(matches!(manager.get(ALICE, note.id).await, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_reply_to_public_note_is_public_and_colocated() {
	let (manager, _adapter, _tmp) = create_manager().await;
	let root = manager
		.create("alice", &root_note("hello", Coords::new(1.0, 1.0), Visibility::Public, &[]))
		.await
		.unwrap();

	let requested = grantees(&["carol"]);
	let child = manager
		.create("bob", &NewNote {
			coords: Some(Coords::new(44.0, 44.0)),
			..reply("hi back", root.id, Visibility::Private, &requested)
		})
		.await
		.unwrap();

	assert_eq!(child.visibility, Visibility::Public);
	assert_eq!((child.longitude, child.latitude), (1.0, 1.0));
	assert_eq!(child.parent_id, Some(root.id));
	assert!(child.grantees.is_none());

	// anyone can read it
	assert!(manager.get(Actor::Anonymous, child.id).await.is_ok());
}

#[tokio::test]
async fn test_reply_to_private_note_snapshots_grants() {
	let (manager, adapter, _tmp) = create_manager().await;
	let audience = grantees(&["bob", "carol"]);
	let root = manager
		.create("alice", &root_note("plan", Coords::new(2.0, 2.0), Visibility::Private, &audience))
		.await
		.unwrap();

	let requested = grantees(&["mallory"]);
	let child = manager
		.create("bob", &reply("agreed", root.id, Visibility::Public, &requested))
		.await
		.unwrap();
	assert_eq!(child.visibility, Visibility::Private);
	assert_eq!(adapter.list_grants(child.id).await.unwrap(), audience);

	// later grants on the parent do not flow to the reply
	adapter.add_grant(root.id, "dave").await.unwrap();
	assert_eq!(adapter.list_grants(child.id).await.unwrap(), audience);
	assert!(matches!(manager.get(Actor::Principal("mallory"), child.id).await, Err(Error::NotFound)));
	assert!(manager.get(CAROL, child.id).await.is_ok());
}

#[tokio::test]
async fn test_reply_requires_readable_parent() {
	let (manager, _adapter, _tmp) = create_manager().await;
	let root = manager
		.create("alice", &root_note("mine", Coords::new(3.0, 3.0), Visibility::Private, &[]))
		.await
		.unwrap();

	let res = manager.create("carol", &reply("sneaky", root.id, Visibility::Private, &[])).await;
	assert!(matches!(res, Err(Error::NotFound)));

	let res = manager.create("alice", &reply("orphan", NoteId(9999), Visibility::Public, &[])).await;
	assert!(matches!(res, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_root_coordinates_conflict_but_replies_share_them() {
	let (manager, _adapter, _tmp) = create_manager().await;
	let spot = Coords::new(5.5, 6.5);
	let root = manager
		.create("alice", &root_note("first", spot, Visibility::Public, &[]))
		.await
		.unwrap();

	let res = manager.create("bob", &root_note("second", spot, Visibility::Public, &[])).await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	manager.create("bob", &reply("r1", root.id, Visibility::Public, &[])).await.unwrap();
	manager.create("carol", &reply("r2", root.id, Visibility::Public, &[])).await.unwrap();
}

#[tokio::test]
async fn test_updating_reply_coordinates_has_no_effect() {
	let (manager, adapter, _tmp) = create_manager().await;
	let root = manager
		.create("alice", &root_note("root", Coords::new(7.0, 7.0), Visibility::Public, &[]))
		.await
		.unwrap();
	let child = manager.create("bob", &reply("child", root.id, Visibility::Public, &[])).await.unwrap();

	let updated =
		manager.update("bob", child.id, "edited", Some(Coords::new(80.0, 80.0))).await.unwrap();
	assert_eq!(updated.text.as_ref(), "edited");
	assert_eq!((updated.longitude, updated.latitude), (7.0, 7.0));

	// moving the root moves the reply along
	manager.update("alice", root.id, "root", Some(Coords::new(8.0, 9.0))).await.unwrap();
	let stored = adapter.read_note(child.id).await.unwrap();
	assert_eq!(stored.coords, Coords::new(8.0, 9.0));
}

#[tokio::test]
async fn test_delete_with_replies_redacts() {
	let (manager, adapter, _tmp) = create_manager().await;
	let audience = grantees(&["bob"]);
	let root = manager
		.create("alice", &root_note("thread", Coords::new(9.0, 9.0), Visibility::Private, &audience))
		.await
		.unwrap();
	let child = manager.create("bob", &reply("reply", root.id, Visibility::Private, &[])).await.unwrap();

	assert_eq!(manager.delete("alice", root.id).await.unwrap(), DeleteOutcome::Redacted);
	let stored = adapter.read_note(root.id).await.unwrap();
	assert_eq!(stored.text.as_ref(), REDACTED_TEXT);
	assert_eq!(stored.visibility, Visibility::Private);
	assert_eq!(stored.coords, Coords::new(9.0, 9.0));
	assert_eq!(stored.owner.as_ref(), "alice");
	assert!(stored.is_deleted());
	assert_eq!(adapter.list_grants(root.id).await.unwrap(), audience);

	let view = manager.get(BOB, root.id).await.unwrap();
	assert!(view.deleted);

	// the childless reply is removed with its grants
	assert_eq!(manager.delete("bob", child.id).await.unwrap(), DeleteOutcome::Removed);
	assert!(matches!(adapter.read_note(child.id).await, Err(Error::NotFound)));
	assert!(adapter.list_grants(child.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_input_validation() {
	let (manager, _adapter, _tmp) = create_manager().await;

	let res = manager
		.create("alice", &root_note("  ", Coords::new(1.0, 1.0), Visibility::Public, &[]))
		.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let res = manager
		.create("alice", &root_note("far", Coords::new(200.0, 1.0), Visibility::Public, &[]))
		.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let res = manager
		.create("alice", &NewNote {
			text: "nowhere",
			coords: None,
			visibility: Visibility::Public,
			grantees: &[],
			parent_id: None,
		})
		.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
}

#[tokio::test]
async fn test_public_note_drops_grantees_and_owner_is_not_a_grantee() {
	let (manager, adapter, _tmp) = create_manager().await;
	let requested = grantees(&["bob"]);
	let public = manager
		.create("alice", &root_note("open", Coords::new(11.0, 11.0), Visibility::Public, &requested))
		.await
		.unwrap();
	assert!(adapter.list_grants(public.id).await.unwrap().is_empty());

	let requested = grantees(&["alice", "bob", "bob"]);
	let private = manager
		.create("alice", &root_note("closed", Coords::new(12.0, 12.0), Visibility::Private, &requested))
		.await
		.unwrap();
	assert_eq!(adapter.list_grants(private.id).await.unwrap(), grantees(&["bob"]));
}

// vim: ts=4
