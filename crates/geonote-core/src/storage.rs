//! Bounded storage calls

use std::future::Future;
use std::time::Duration;

use crate::prelude::*;

/// Deadline for a single storage call unless configured otherwise
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a storage future, giving up after `limit`.
///
/// On timeout the in-flight future is dropped, which cancels the storage call.
pub async fn bounded<T, F>(limit: Duration, op: &'static str, fut: F) -> GnResult<T>
where
	F: Future<Output = GnResult<T>>,
{
	match tokio::time::timeout(limit, fut).await {
		Ok(res) => res,
		Err(_) => {
			warn!(op = op, limit_ms = limit.as_millis() as u64, "Storage call timed out");
			Err(Error::Timeout)
		}
	}
}


// vim: ts=4
