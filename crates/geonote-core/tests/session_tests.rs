//! Session tokens backed by the persisted revocation ledger, and storage deadlines

use async_trait::async_trait;
use geonote_auth_adapter_sqlite::AuthAdapterSqlite;
use geonote_core::{Actor, NoteHierarchyManager, SessionAuthority};
use geonote_types::auth_adapter::{AuthAdapter, RevocationLedger};
use geonote_types::note_adapter::{CreateNoteData, NoteAdapter, UpdateNoteData};
use geonote_types::prelude::*;
use geonote_types::types::{BoundingBox, Note};
use geonote_types::worker::WorkerPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn create_auth_adapter(tmp_dir: &TempDir) -> Arc<AuthAdapterSqlite> {
	let worker = Arc::new(WorkerPool::new(1, 1));
	Arc::new(AuthAdapterSqlite::new(worker, tmp_dir.path().join("auth.db")).await.unwrap())
}

#[tokio::test]
async fn test_logout_survives_restart() {
	let tmp_dir = TempDir::new().unwrap();
	let token = {
		let adapter = create_auth_adapter(&tmp_dir).await;
		let secret = adapter.ensure_session_secret().await.unwrap();
		let sessions = SessionAuthority::with_default_ttl(secret.as_bytes(), adapter).unwrap();

		let issued = sessions.issue("alice").unwrap();
		let ctx = sessions.validate(&issued.token).await.unwrap();
		sessions.revoke(&ctx).await.unwrap();
		issued.token
	};

	// A fresh authority over the same database still rejects the token
	let adapter = create_auth_adapter(&tmp_dir).await;
	let secret = adapter.ensure_session_secret().await.unwrap();
	let sessions = SessionAuthority::with_default_ttl(secret.as_bytes(), adapter).unwrap();
	let res = sessions.validate(&token).await;
	assert!(matches!(res, Err(Error::Unauthorized(AuthError::Revoked))));
}

#[tokio::test]
async fn test_other_sessions_stay_valid() {
	let tmp_dir = TempDir::new().unwrap();
	let adapter = create_auth_adapter(&tmp_dir).await;
	let sessions = SessionAuthority::with_default_ttl(b"0123456789abcdef0123", adapter.clone())
		.unwrap();

	let first = sessions.issue("alice").unwrap();
	let second = sessions.issue("alice").unwrap();
	assert_ne!(first.claims.jti, second.claims.jti);

	let ctx = sessions.validate(&first.token).await.unwrap();
	sessions.revoke(&ctx).await.unwrap();
	// revoking again is harmless
	sessions.revoke(&ctx).await.unwrap();

	assert!(adapter.is_revoked(&first.claims.jti).await.unwrap());
	assert!(sessions.validate(&second.token).await.is_ok());
	assert!(sessions.validate_optional(Some(&first.token)).await.is_none());
}

/// Never-completing storage
#[derive(Debug)]
struct StalledAdapter;

async fn stall<T>() -> GnResult<T> {
	tokio::time::sleep(Duration::from_secs(3600)).await;
	Err(Error::ServiceUnavailable("stalled".into()))
}

#[async_trait]
impl NoteAdapter for StalledAdapter {
	async fn read_note(&self, _note_id: NoteId) -> GnResult<Note> {
		stall().await
	}
	async fn create_note(&self, _data: &CreateNoteData<'_>) -> GnResult<Note> {
		stall().await
	}
	async fn update_note(&self, _note_id: NoteId, _data: &UpdateNoteData<'_>) -> GnResult<Note> {
		stall().await
	}
	async fn soft_delete_note(&self, _note_id: NoteId, _marker: &str) -> GnResult<()> {
		stall().await
	}
	async fn hard_delete_note(&self, _note_id: NoteId) -> GnResult<bool> {
		stall().await
	}
	async fn has_children(&self, _note_id: NoteId) -> GnResult<bool> {
		stall().await
	}
	async fn list_notes_by_owner(&self, _owner: &str) -> GnResult<Vec<Note>> {
		stall().await
	}
	async fn list_notes_in_box(&self, _bbox: &BoundingBox) -> GnResult<Vec<Note>> {
		stall().await
	}
	async fn list_grants(&self, _note_id: NoteId) -> GnResult<Vec<Box<str>>> {
		stall().await
	}
	async fn list_grants_for(
		&self,
		_note_ids: &[NoteId],
	) -> GnResult<HashMap<NoteId, Vec<Box<str>>>> {
		stall().await
	}
	async fn add_grant(&self, _note_id: NoteId, _grantee: &str) -> GnResult<()> {
		stall().await
	}
}

#[tokio::test(start_paused = true)]
async fn test_stalled_storage_times_out() {
	let manager = NoteHierarchyManager::new(Arc::new(StalledAdapter), Duration::from_millis(500));
	let res = manager.get(Actor::Principal("alice"), NoteId(1)).await;
	assert!(matches!(res, Err(Error::Timeout)));

	let res = manager.delete("alice", NoteId(1)).await;
	assert!(matches!(res, Err(Error::Timeout)));
}

// vim: ts=4
