//! Session middlewares

use axum::{
	body::Body,
	extract::State,
	http::{HeaderMap, Request, Response, header},
	middleware::Next,
};

use crate::extract::Auth;
use crate::prelude::*;
use geonote_types::error::SESSION_COOKIE;

/// Reads the session token from `Authorization: Bearer` or, failing that, the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
	let bearer = headers
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|token| !token.is_empty());
	if bearer.is_some() {
		return bearer;
	}

	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|h| h.to_str().ok())
		.flat_map(|h| h.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
		.map(|(_, value)| value)
}

pub async fn require_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> GnResult<Response<Body>> {
	let token = session_token(req.headers()).ok_or(Error::Unauthorized(AuthError::Missing))?;
	let ctx = app.sessions.validate(token).await?;

	req.extensions_mut().insert(Auth(ctx));

	Ok(next.run(req).await)
}

pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> GnResult<Response<Body>> {
	if let Some(ctx) = app.sessions.validate_optional(session_token(req.headers())).await {
		req.extensions_mut().insert(Auth(ctx));
	}

	Ok(next.run(req).await)
}


// vim: ts=4
