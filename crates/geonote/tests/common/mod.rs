//! Common test utilities and helpers
//!
//! Builds a complete application over throw-away SQLite databases and drives the
//! assembled router with `oneshot` requests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
	Router,
	body::Body,
	http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use geonote::error::{Error, GnResult};
use geonote::worker::WorkerPool;
use geonote::{App, AppBuilder, routes};
use geonote_auth_adapter_sqlite::AuthAdapterSqlite;
use geonote_meta_adapter_sqlite::MetaAdapterSqlite;
use geonote_types::mailer::Mailer;

pub const PASSWORD: &str = "correct horse battery";

/// Remembers every code it is asked to deliver, or fails every delivery
#[derive(Debug, Default)]
pub struct RecordingMailer {
	pub sent: Mutex<Vec<(String, String)>>,
	pub fail: bool,
}

impl RecordingMailer {
	pub fn last_code(&self, address: &str) -> Option<String> {
		let sent = self.sent.lock().unwrap();
		sent.iter().rev().find(|(to, _)| to == address).map(|(_, code)| code.clone())
	}
}

#[async_trait]
impl Mailer for RecordingMailer {
	async fn send_verification_code(&self, address: &str, code: &str) -> GnResult<()> {
		if self.fail {
			return Err(Error::ServiceUnavailable("relay refused".into()));
		}
		self.sent.lock().unwrap().push((address.to_string(), code.to_string()));
		Ok(())
	}
}

pub struct TestApp {
	pub app: App,
	pub router: Router,
	pub mailer: Arc<RecordingMailer>,
	_tmp: TempDir,
}

pub async fn create_app_with(
	mailer: RecordingMailer,
	configure: impl FnOnce(&mut AppBuilder),
) -> TestApp {
	let tmp_dir = TempDir::new().unwrap();
	let worker = Arc::new(WorkerPool::new(1, 1));
	let auth_adapter = Arc::new(
		AuthAdapterSqlite::new(worker.clone(), tmp_dir.path().join("auth.db")).await.unwrap(),
	);
	let note_adapter =
		Arc::new(MetaAdapterSqlite::new(tmp_dir.path().join("notes.db")).await.unwrap());
	let mailer = Arc::new(mailer);

	let mut builder = AppBuilder::new();
	builder
		.dist_dir(tmp_dir.path())
		.login_failure_delay(Duration::ZERO)
		// password hashing in debug builds is slow
		.storage_timeout(Duration::from_secs(60))
		.worker(worker)
		.auth_adapter(auth_adapter.clone())
		.revocation_ledger(auth_adapter)
		.note_adapter(note_adapter)
		.mailer(mailer.clone());
	configure(&mut builder);

	let app = builder.build().await.unwrap();
	let router = routes::init(app.clone());
	TestApp { app, router, mailer, _tmp: tmp_dir }
}

pub async fn create_app() -> TestApp {
	create_app_with(RecordingMailer::default(), |_| {}).await
}

pub struct TestResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Value,
}

impl TestResponse {
	pub fn error_code(&self) -> &str {
		self.body["error"]["code"].as_str().unwrap_or_default()
	}

	pub fn set_cookie(&self) -> Option<&str> {
		self.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok())
	}
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
	let res = router.clone().oneshot(request).await.unwrap();
	let status = res.status();
	let headers = res.headers().clone();
	let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
	let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
	TestResponse { status, headers, body }
}

pub async fn call(
	router: &Router,
	method: &str,
	uri: &str,
	token: Option<&str>,
	body: Option<Value>,
) -> TestResponse {
	let mut builder = Request::builder().method(method).uri(uri);
	if let Some(token) = token {
		builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
	}
	let request = match body {
		Some(body) => builder
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => builder.body(Body::empty()).unwrap(),
	};
	send(router, request).await
}

pub async fn register(router: &Router, username: &str) {
	let res = call(
		router,
		"POST",
		"/api/auth/register",
		None,
		Some(json!({ "username": username, "password": PASSWORD })),
	)
	.await;
	assert_eq!(res.status, StatusCode::CREATED, "register {}: {}", username, res.body);
}

pub async fn login(router: &Router, username: &str) -> String {
	let res = call(
		router,
		"POST",
		"/api/auth/login",
		None,
		Some(json!({ "username": username, "password": PASSWORD })),
	)
	.await;
	assert_eq!(res.status, StatusCode::OK, "login {}: {}", username, res.body);
	res.body["data"]["token"].as_str().unwrap().to_string()
}

/// Registers and logs in each user, returning their tokens in order
pub async fn sign_up(router: &Router, usernames: &[&str]) -> Vec<String> {
	let mut tokens = Vec::with_capacity(usernames.len());
	for username in usernames {
		register(router, username).await;
		tokens.push(login(router, username).await);
	}
	tokens
}

// vim: ts=4
