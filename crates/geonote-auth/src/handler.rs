use axum::{
	Json,
	extract::State,
	http::{HeaderName, StatusCode, header},
};
use serde::{Deserialize, Serialize};

use geonote_core::Auth;
use geonote_core::storage::bounded;
use geonote_types::auth_adapter::SessionToken;
use geonote_types::error::{SESSION_COOKIE, clear_cookie_header};
use geonote_types::types::ApiResponse;

use crate::prelude::*;

type CookieHeader = [(HeaderName, String); 1];

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, ttl: i64) -> String {
	format!("{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}", SESSION_COOKIE, token, ttl)
}

/// # Login
#[derive(Serialize)]
pub struct Login {
	token: Box<str>,
	username: Box<str>,
	expires_at: Timestamp,
}

impl From<SessionToken> for Login {
	fn from(session: SessionToken) -> Self {
		Self { token: session.token, username: session.claims.sub, expires_at: session.claims.exp }
	}
}

/// # POST /api/auth/login
#[derive(Deserialize)]
pub struct LoginReq {
	username: String,
	password: String,
}

pub async fn post_login(
	State(app): State<App>,
	Json(login): Json<LoginReq>,
) -> GnResult<(StatusCode, CookieHeader, Json<ApiResponse<Login>>)> {
	let checked = bounded(
		app.opts.storage_timeout,
		"check_password",
		app.auth_adapter.check_password(&login.username, &login.password),
	)
	.await;
	match checked {
		Ok(()) => {}
		Err(Error::Unauthorized(AuthError::InvalidCredentials)) => {
			info!(username = %login.username, "Login failed");
			tokio::time::sleep(app.opts.login_failure_delay).await;
			return Err(Error::Unauthorized(AuthError::InvalidCredentials));
		}
		Err(err) => return Err(err),
	}

	let session = app.sessions.issue(&login.username)?;
	let cookie = session_cookie(&session.token, app.sessions.ttl());
	info!(username = %login.username, "Login succeeded");

	Ok((
		StatusCode::OK,
		[(header::SET_COOKIE, cookie)],
		Json(ApiResponse::new(Login::from(session))),
	))
}

/// # POST /api/auth/logout
///
/// Revokes the presented token and clears the session cookie
pub async fn post_logout(
	State(app): State<App>,
	Auth(auth): Auth,
) -> GnResult<(StatusCode, CookieHeader, Json<ApiResponse<()>>)> {
	app.sessions.revoke(&auth).await?;
	info!(username = %auth.id_tag, "User logged out");

	Ok((StatusCode::OK, [(header::SET_COOKIE, clear_cookie_header())], Json(ApiResponse::new(()))))
}

/// # GET /api/auth/session
#[derive(Serialize)]
pub struct Session {
	username: Box<str>,
	issued_at: Timestamp,
	expires_at: Timestamp,
}

pub async fn get_session(Auth(auth): Auth) -> GnResult<(StatusCode, Json<ApiResponse<Session>>)> {
	let session =
		Session { username: auth.id_tag, issued_at: auth.issued_at, expires_at: auth.expires_at };

	Ok((StatusCode::OK, Json(ApiResponse::new(session))))
}


// vim: ts=4
