//! Adapter that stores credentials, verification codes and revoked sessions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// Default session lifetime in seconds (24 hours)
pub const SESSION_TOKEN_EXPIRY: i64 = 86400;

/// Verification codes are valid for 24 hours
pub const VERIFICATION_CODE_EXPIRY: i64 = 86400;

/// Session tokens are HS256 JWTs carrying these claims.
///
/// Decoding into this struct is strict: any other shape is rejected as malformed.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionClaims {
	/// Subject - the principal's username
	pub sub: Box<str>,

	/// Issued At
	pub iat: Timestamp,

	/// Expires At
	pub exp: Timestamp,

	/// Token identifier, the key used by the revocation ledger
	pub jti: Box<str>,
}

/// Context struct for an authenticated user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthCtx {
	pub id_tag: Box<str>,
	pub token_id: Box<str>,
	pub issued_at: Timestamp,
	pub expires_at: Timestamp,
}

impl From<SessionClaims> for AuthCtx {
	fn from(claims: SessionClaims) -> Self {
		Self { id_tag: claims.sub, token_id: claims.jti, issued_at: claims.iat, expires_at: claims.exp }
	}
}

/// A freshly issued session token
#[derive(Debug, Clone)]
pub struct SessionToken {
	pub token: Box<str>,
	pub claims: SessionClaims,
}

/// Data needed to create a new user
#[derive(Debug)]
pub struct CreateUserData<'a> {
	pub id_tag: &'a str,
	pub password: &'a str,
	pub email: Option<&'a str>,
	/// Verification code for `email`, consumed together with the account insert
	pub email_code: Option<&'a str>,
}

/// A `geonote` auth adapter (the credential store)
///
/// Stores password hashes, pending email verification codes and the session signing
/// secret. Passwords never leave the adapter: it hashes and verifies them itself.
#[async_trait]
pub trait AuthAdapter: Debug + Send + Sync {
	/// Creates a user account. Fails with `Conflict` on duplicate username or email.
	///
	/// When `email_code` is given it is consumed in the same transaction as the insert:
	/// a failed insert leaves the code usable, and a bad code creates no account.
	async fn create_user(&self, data: CreateUserData<'_>) -> GnResult<()>;

	/// Checks whether a username is registered
	async fn user_exists(&self, id_tag: &str) -> GnResult<bool>;

	/// Verifies a password, failing with `Unauthorized(InvalidCredentials)`
	async fn check_password(&self, id_tag: &str, password: &str) -> GnResult<()>;

	/// Creates (or replaces) a verification code for an email address and returns it
	async fn create_verification_code(&self, email: &str) -> GnResult<Box<str>>;

	/// Removes expired verification codes, returning how many were removed
	async fn cleanup_expired_verification_codes(&self) -> GnResult<u32>;

	/// Reads the session signing secret, generating and storing one on first use
	async fn ensure_session_secret(&self) -> GnResult<Box<str>>;
}

/// The set of revoked session token identifiers.
///
/// Shared by all concurrent requests. Records are never removed.
#[async_trait]
pub trait RevocationLedger: Debug + Send + Sync {
	/// Marks a token identifier revoked. Revoking twice is not an error.
	async fn revoke(&self, token_id: &str, expires_at: Timestamp) -> GnResult<()>;

	/// Checks whether a token identifier was revoked
	async fn is_revoked(&self, token_id: &str) -> GnResult<bool>;
}


// vim: ts=4
