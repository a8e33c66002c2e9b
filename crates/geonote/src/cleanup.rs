//! Periodic cleanup of expired auth data

use std::time::Duration;

use crate::prelude::*;
use geonote_core::storage::bounded;

pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Removes expired verification codes. Revoked session records are kept.
pub async fn run_cleanup(app: &App) -> u32 {
	let res = bounded(
		app.opts.storage_timeout,
		"cleanup_expired_verification_codes",
		app.auth_adapter.cleanup_expired_verification_codes(),
	)
	.await;
	match res {
		Ok(count) => {
			if count > 0 {
				info!("Cleaned up {} expired verification codes", count);
			}
			count
		}
		Err(e) => {
			warn!("Failed to cleanup expired verification codes: {}", e);
			0
		}
	}
}

/// Runs `run_cleanup` now and then every `CLEANUP_INTERVAL`
pub fn spawn(app: App) -> tokio::task::JoinHandle<()> {
	tokio::spawn(async move {
		let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
		interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
		loop {
			interval.tick().await;
			debug!("Running auth cleanup task");
			run_cleanup(&app).await;
		}
	})
}

// vim: ts=4
