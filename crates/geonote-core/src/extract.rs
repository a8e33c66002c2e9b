//! Custom extractors for geonote-specific data

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::abac::Actor;
use crate::prelude::*;
use geonote_types::auth_adapter;

// Auth //
//******//
#[derive(Debug, Clone)]
pub struct Auth(pub auth_adapter::AuthCtx);

impl Auth {
	pub fn actor(&self) -> Actor<'_> {
		Actor::from(&self.0)
	}
}

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::Unauthorized(AuthError::Missing))
		}
	}
}

// OptionalAuth //
//***************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<auth_adapter::AuthCtx>);

impl OptionalAuth {
	pub fn actor(&self) -> Actor<'_> {
		Actor::from(self.0.as_ref())
	}
}

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().cloned().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}

// vim: ts=4
