//! In-memory revocation ledger

use async_trait::async_trait;
use dashmap::DashMap;

use crate::prelude::*;
use geonote_types::auth_adapter::RevocationLedger;

/// Process-local set of revoked token identifiers.
///
/// Revocations are lost on restart; use the SQLite auth adapter's ledger when they
/// must survive one.
#[derive(Debug, Default)]
pub struct MemoryRevocationLedger {
	revoked: DashMap<Box<str>, Timestamp>,
}

impl MemoryRevocationLedger {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.revoked.len()
	}

	pub fn is_empty(&self) -> bool {
		self.revoked.is_empty()
	}
}

#[async_trait]
impl RevocationLedger for MemoryRevocationLedger {
	async fn revoke(&self, token_id: &str, expires_at: Timestamp) -> GnResult<()> {
		// first record wins, a second revoke leaves it untouched
		self.revoked.entry(token_id.into()).or_insert(expires_at);
		Ok(())
	}

	async fn is_revoked(&self, token_id: &str) -> GnResult<bool> {
		Ok(self.revoked.contains_key(token_id))
	}
}


// vim: ts=4
