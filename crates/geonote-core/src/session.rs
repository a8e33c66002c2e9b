//! Session token issuing, validation and revocation

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use std::time::Duration;

use crate::prelude::*;
use crate::storage::{DEFAULT_STORAGE_TIMEOUT, bounded};
use geonote_types::auth_adapter::{
	AuthCtx, RevocationLedger, SESSION_TOKEN_EXPIRY, SessionClaims, SessionToken,
};
use geonote_types::utils::random_id;

/// Longest accepted session lifetime (ten years)
pub const MAX_SESSION_TTL: i64 = 10 * 365 * 86400;

/// Issues HS256 session tokens and checks presented ones against expiry and the
/// revocation ledger.
pub struct SessionAuthority {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	ttl: i64,
	timeout: Duration,
	ledger: Arc<dyn RevocationLedger>,
}

impl std::fmt::Debug for SessionAuthority {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionAuthority")
			.field("ttl", &self.ttl)
			.field("timeout", &self.timeout)
			.field("ledger", &self.ledger)
			.finish_non_exhaustive()
	}
}

impl SessionAuthority {
	pub fn new(secret: &[u8], ttl: i64, ledger: Arc<dyn RevocationLedger>) -> GnResult<Self> {
		if secret.len() < 16 {
			return Err(Error::ConfigError("session secret must be at least 16 bytes".into()));
		}
		if ttl <= 0 || ttl > MAX_SESSION_TTL {
			return Err(Error::ConfigError(format!(
				"session TTL must be between 1 and {} seconds",
				MAX_SESSION_TTL
			)));
		}

		// Expiry is checked by hand after the revocation lookup
		let mut validation = Validation::new(Algorithm::HS256);
		validation.validate_exp = false;
		validation.leeway = 0;
		validation.set_required_spec_claims(&["exp", "sub"]);

		Ok(Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			validation,
			ttl,
			timeout: DEFAULT_STORAGE_TIMEOUT,
			ledger,
		})
	}

	/// Sets the deadline for each revocation ledger call
	pub fn with_storage_timeout(mut self, limit: Duration) -> Self {
		self.timeout = limit;
		self
	}

	pub fn with_default_ttl(secret: &[u8], ledger: Arc<dyn RevocationLedger>) -> GnResult<Self> {
		Self::new(secret, SESSION_TOKEN_EXPIRY, ledger)
	}

	pub fn ttl(&self) -> i64 {
		self.ttl
	}

	pub fn issue(&self, id_tag: &str) -> GnResult<SessionToken> {
		self.issue_at(id_tag, Timestamp::now())
	}

	pub fn issue_at(&self, id_tag: &str, now: Timestamp) -> GnResult<SessionToken> {
		let claims = SessionClaims {
			sub: id_tag.into(),
			iat: now,
			exp: now.add_seconds(self.ttl),
			jti: random_id().into(),
		};
		let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
			.map_err(|err| Error::Internal(format!("cannot sign session token: {}", err)))?;
		debug!(subject = %claims.sub, exp = %claims.exp, "Session issued");

		Ok(SessionToken { token: token.into(), claims })
	}

	pub async fn validate(&self, token: &str) -> GnResult<AuthCtx> {
		self.validate_at(token, Timestamp::now()).await
	}

	/// Validates a token as of `now`.
	///
	/// Checks run in order: signature and claim shape (`Malformed`), revocation
	/// (`Revoked`), expiry (`Expired`). A revoked token that also expired reports
	/// `Revoked`.
	pub async fn validate_at(&self, token: &str, now: Timestamp) -> GnResult<AuthCtx> {
		let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
			.map_err(|err| {
				debug!("Rejected session token: {}", err);
				AuthError::Malformed
			})?
			.claims;

		if bounded(self.timeout, "is_revoked", self.ledger.is_revoked(&claims.jti)).await? {
			debug!(subject = %claims.sub, "Session token revoked");
			return Err(AuthError::Revoked.into());
		}

		if now > claims.exp {
			debug!(subject = %claims.sub, exp = %claims.exp, "Session token expired");
			return Err(AuthError::Expired.into());
		}

		Ok(claims.into())
	}

	/// Like `validate`, but any failure (or no token at all) yields an anonymous caller
	pub async fn validate_optional(&self, token: Option<&str>) -> Option<AuthCtx> {
		let token = token?;
		match self.validate(token).await {
			Ok(ctx) => Some(ctx),
			Err(err) => {
				debug!("Treating request as anonymous: {}", err);
				None
			}
		}
	}

	/// Revokes the session; revoking an already revoked session is a no-op
	pub async fn revoke(&self, session: &AuthCtx) -> GnResult<()> {
		bounded(self.timeout, "revoke", self.ledger.revoke(&session.token_id, session.expires_at))
			.await?;
		info!(subject = %session.id_tag, "Session revoked");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ledger::MemoryRevocationLedger;

	const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

	fn authority() -> SessionAuthority {
		SessionAuthority::new(SECRET, 3600, Arc::new(MemoryRevocationLedger::new())).unwrap()
	}

	#[tokio::test]
	async fn test_issue_and_validate() {
		let auth = authority();
		let session = auth.issue("alice").unwrap();
		assert_eq!(session.claims.exp.0 - session.claims.iat.0, 3600);

		let ctx = auth.validate(&session.token).await.unwrap();
		assert_eq!(ctx.id_tag.as_ref(), "alice");
		assert_eq!(ctx.token_id, session.claims.jti);
	}

	#[tokio::test]
	async fn test_revoked_before_expiry() {
		let auth = authority();
		let session = auth.issue("alice").unwrap();
		let ctx = auth.validate(&session.token).await.unwrap();

		auth.revoke(&ctx).await.unwrap();
		auth.revoke(&ctx).await.unwrap();

		let res = auth.validate(&session.token).await;
		assert!(matches!(res, Err(Error::Unauthorized(AuthError::Revoked))));
	}

	#[tokio::test]
	async fn test_expired_without_revocation() {
		let auth = authority();
		let issued = Timestamp(1_000_000);
		let session = auth.issue_at("alice", issued).unwrap();

		assert!(auth.validate_at(&session.token, issued.add_seconds(3600)).await.is_ok());
		let res = auth.validate_at(&session.token, issued.add_seconds(3601)).await;
		assert!(matches!(res, Err(Error::Unauthorized(AuthError::Expired))));
	}

	#[tokio::test]
	async fn test_revoked_takes_precedence_over_expired() {
		let auth = authority();
		let issued = Timestamp(1_000_000);
		let session = auth.issue_at("alice", issued).unwrap();
		let ctx = auth.validate_at(&session.token, issued).await.unwrap();
		auth.revoke(&ctx).await.unwrap();

		let res = auth.validate_at(&session.token, issued.add_seconds(10_000)).await;
		assert!(matches!(res, Err(Error::Unauthorized(AuthError::Revoked))));
	}

	#[tokio::test]
	async fn test_malformed_tokens() {
		let auth = authority();
		for token in ["", "garbage", "a.b.c"] {
			let res = auth.validate(token).await;
			assert!(matches!(res, Err(Error::Unauthorized(AuthError::Malformed))));
		}

		// signed with another secret
		let other = SessionAuthority::new(
			b"ffffffffffffffffffffffffffffffff",
			3600,
			Arc::new(MemoryRevocationLedger::new()),
		)
		.unwrap();
		let foreign = other.issue("alice").unwrap();
		let res = auth.validate(&foreign.token).await;
		assert!(matches!(res, Err(Error::Unauthorized(AuthError::Malformed))));
	}

	#[tokio::test]
	async fn test_unexpected_claim_shape_is_malformed() {
		let auth = authority();
		let token = jsonwebtoken::encode(
			&Header::new(Algorithm::HS256),
			&serde_json::json!({ "name": "alice", "exp": 9_999_999_999_i64 }),
			&EncodingKey::from_secret(SECRET),
		)
		.unwrap();
		let res = auth.validate(&token).await;
		assert!(matches!(res, Err(Error::Unauthorized(AuthError::Malformed))));
	}

	#[tokio::test]
	async fn test_validate_optional_degrades_to_anonymous() {
		let auth = authority();
		assert!(auth.validate_optional(None).await.is_none());
		assert!(auth.validate_optional(Some("garbage")).await.is_none());

		let session = auth.issue("bob").unwrap();
		let ctx = auth.validate_optional(Some(&session.token)).await.unwrap();
		assert_eq!(ctx.id_tag.as_ref(), "bob");

		auth.revoke(&ctx).await.unwrap();
		assert!(auth.validate_optional(Some(&session.token)).await.is_none());
	}

	#[test]
	fn test_rejects_weak_config() {
		let ledger = Arc::new(MemoryRevocationLedger::new());
		assert!(SessionAuthority::new(b"short", 3600, ledger.clone()).is_err());
		assert!(SessionAuthority::new(SECRET, 0, ledger.clone()).is_err());
		assert!(SessionAuthority::new(SECRET, MAX_SESSION_TTL, ledger.clone()).is_ok());
		let res = SessionAuthority::new(SECRET, i64::MAX, ledger);
		assert!(matches!(res, Err(Error::ConfigError(_))));
	}

	/// Revocation ledger that never answers
	#[derive(Debug)]
	struct StalledLedger;

	#[async_trait::async_trait]
	impl RevocationLedger for StalledLedger {
		async fn revoke(&self, _token_id: &str, _expires_at: Timestamp) -> GnResult<()> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(())
		}

		async fn is_revoked(&self, _token_id: &str) -> GnResult<bool> {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok(false)
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_stalled_ledger_times_out() {
		let auth = SessionAuthority::new(SECRET, 3600, Arc::new(StalledLedger))
			.unwrap()
			.with_storage_timeout(Duration::from_millis(500));
		let session = auth.issue("alice").unwrap();

		let res = auth.validate(&session.token).await;
		assert!(matches!(res, Err(Error::Timeout)));

		let ctx = AuthCtx::from(session.claims);
		let res = auth.revoke(&ctx).await;
		assert!(matches!(res, Err(Error::Timeout)));

		// optional routes fall back to anonymous
		assert!(auth.validate_optional(Some(&session.token)).await.is_none());
	}
}

// vim: ts=4
