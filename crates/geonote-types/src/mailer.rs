//! Outbound mail collaborator.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

/// Delivers verification codes to email addresses.
///
/// A failed delivery is reported to the caller that requested the code and nowhere else.
#[async_trait]
pub trait Mailer: Debug + Send + Sync {
	async fn send_verification_code(&self, address: &str, code: &str) -> GnResult<()>;
}

// vim: ts=4
