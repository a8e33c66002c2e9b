//! Email verification code and revocation ledger tests

use geonote::auth_adapter::{AuthAdapter, CreateUserData, RevocationLedger};
use geonote::prelude::*;
use geonote::worker::WorkerPool;
use geonote_auth_adapter_sqlite::AuthAdapterSqlite;
use std::sync::Arc;
use tempfile::TempDir;

async fn create_test_adapter() -> (AuthAdapterSqlite, TempDir) {
	let tmp_dir = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1, 1));
	let adapter = AuthAdapterSqlite::new(worker, tmp_dir.path().join("auth.db")).await.unwrap();
	(adapter, tmp_dir)
}

/// Registers `id_tag` with an email address and its verification code
async fn register(
	adapter: &AuthAdapterSqlite,
	id_tag: &str,
	email: &str,
	code: &str,
) -> GnResult<()> {
	adapter
		.create_user(CreateUserData {
			id_tag,
			password: "password_123",
			email: Some(email),
			email_code: Some(code),
		})
		.await
}

#[tokio::test]
async fn test_code_works_once() {
	let (adapter, _tmp) = create_test_adapter().await;

	let code = adapter.create_verification_code("alice@example.com").await.unwrap();
	assert!(code.chars().all(|c| c.is_ascii_digit()));

	register(&adapter, "alice", "alice@example.com", &code).await.unwrap();
	assert!(adapter.user_exists("alice").await.unwrap());

	// a used code fails before the insert could collide on the email
	let res = register(&adapter, "alice2", "alice@example.com", &code).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
	assert!(!adapter.user_exists("alice2").await.unwrap());
}

#[tokio::test]
async fn test_code_is_bound_to_email() {
	let (adapter, _tmp) = create_test_adapter().await;

	let code = adapter.create_verification_code("alice@example.com").await.unwrap();
	let res = register(&adapter, "bob", "bob@example.com", &code).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let res = register(&adapter, "alice", "alice@example.com", "not-the-code").await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
	assert!(!adapter.user_exists("alice").await.unwrap());
	assert!(!adapter.user_exists("bob").await.unwrap());
}

#[tokio::test]
async fn test_code_requires_email() {
	let (adapter, _tmp) = create_test_adapter().await;

	let code = adapter.create_verification_code("alice@example.com").await.unwrap();
	let res = adapter
		.create_user(CreateUserData {
			id_tag: "alice",
			password: "password_123",
			email: None,
			email_code: Some(&code),
		})
		.await;
	assert!(matches!(res, Err(Error::ValidationError(_))));
	assert!(!adapter.user_exists("alice").await.unwrap());
}

#[tokio::test]
async fn test_failed_insert_keeps_code() {
	let (adapter, _tmp) = create_test_adapter().await;
	adapter
		.create_user(CreateUserData {
			id_tag: "alice",
			password: "password_123",
			email: None,
			email_code: None,
		})
		.await
		.unwrap();

	let code = adapter.create_verification_code("bob@example.com").await.unwrap();
	let res = register(&adapter, "alice", "bob@example.com", &code).await;
	assert!(matches!(res, Err(Error::Conflict(_))));

	// the rolled back transaction left the code in place
	register(&adapter, "bob", "bob@example.com", &code).await.unwrap();
	assert!(adapter.user_exists("bob").await.unwrap());
}

#[tokio::test]
async fn test_new_code_replaces_old() {
	let (adapter, _tmp) = create_test_adapter().await;

	let first = adapter.create_verification_code("alice@example.com").await.unwrap();
	let second = adapter.create_verification_code("alice@example.com").await.unwrap();

	if first != second {
		let res = register(&adapter, "alice", "alice@example.com", &first).await;
		assert!(res.is_err());
	}
	register(&adapter, "alice", "alice@example.com", &second).await.unwrap();
}

#[tokio::test]
async fn test_cleanup_keeps_fresh_codes() {
	let (adapter, _tmp) = create_test_adapter().await;

	let code = adapter.create_verification_code("alice@example.com").await.unwrap();
	assert_eq!(adapter.cleanup_expired_verification_codes().await.unwrap(), 0);
	register(&adapter, "alice", "alice@example.com", &code).await.unwrap();
}

#[tokio::test]
async fn test_revocations_persist() {
	let tmp_dir = TempDir::new().unwrap();
	let db_path = tmp_dir.path().join("auth.db");
	let worker = Arc::new(WorkerPool::new(1, 1));

	let adapter = AuthAdapterSqlite::new(worker.clone(), &db_path).await.unwrap();
	assert!(!adapter.is_revoked("jti-1").await.unwrap());
	adapter.revoke("jti-1", Timestamp(100)).await.unwrap();
	adapter.revoke("jti-1", Timestamp(100)).await.unwrap();
	assert!(adapter.is_revoked("jti-1").await.unwrap());
	drop(adapter);

	let adapter = AuthAdapterSqlite::new(worker, &db_path).await.unwrap();
	assert!(adapter.is_revoked("jti-1").await.unwrap());
	assert!(!adapter.is_revoked("jti-2").await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_revokes() {
	let (adapter, _tmp) = create_test_adapter().await;
	let adapter = Arc::new(adapter);

	let mut handles = Vec::new();
	for _ in 0..8 {
		let adapter = adapter.clone();
		handles.push(tokio::spawn(async move { adapter.revoke("jti-x", Timestamp(1)).await }));
	}
	for handle in handles {
		handle.await.unwrap().unwrap();
	}
	assert!(adapter.is_revoked("jti-x").await.unwrap());
}

// vim: ts=4
