//! Password hashing, run on the worker pool

use geonote::{prelude::*, worker};

const BCRYPT_COST: u32 = 10;

fn generate_password_hash_sync(password: &str) -> GnResult<Box<str>> {
	let hash = bcrypt::hash(password, BCRYPT_COST)
		.map_err(|err| Error::Internal(format!("password hashing failed: {}", err)))?;

	Ok(hash.into())
}

pub(crate) async fn generate_password_hash(
	worker: &worker::WorkerPool,
	password: Box<str>,
) -> GnResult<Box<str>> {
	worker.try_run(move || generate_password_hash_sync(&password)).await
}

fn check_password_sync(password: &str, password_hash: &str) -> GnResult<()> {
	// A corrupt hash is treated like a mismatch
	if bcrypt::verify(password, password_hash).unwrap_or(false) {
		Ok(())
	} else {
		Err(AuthError::InvalidCredentials.into())
	}
}

pub(crate) async fn check_password(
	worker: &worker::WorkerPool,
	password: Box<str>,
	password_hash: Box<str>,
) -> GnResult<()> {
	worker.try_run_immed(move || check_password_sync(&password, &password_hash)).await
}

// vim: ts=4
