//! Utility functions

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::prelude::*;

pub const ID_LENGTH: usize = 24;
pub const CODE_LENGTH: usize = 8;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

fn random_string(len: usize) -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(len);

	for _ in 0..len {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result
}

/// Random identifier used for session token ids
pub fn random_id() -> String {
	random_string(ID_LENGTH)
}

/// Short random code sent by email. Digits only, so it is easy to type.
pub fn random_code() -> String {
	let mut rng = rand::rng();
	(0..CODE_LENGTH).map(|_| SAFE[rng.random_range(0..10)]).collect()
}

/// Content hash used to store verification codes at rest
pub fn hash(prefix: &str, data: &[u8]) -> Box<str> {
	let mut hasher = Sha256::new();
	hasher.update(data);
	let result = prefix.to_string() + "1~" + &URL_SAFE_NO_PAD.encode(hasher.finalize());
	result.into()
}

/// Validate a username: 1-64 chars of `[A-Za-z0-9_.-]`
pub fn validate_id_tag(id_tag: &str) -> GnResult<()> {
	if id_tag.is_empty() || id_tag.len() > 64 {
		return Err(Error::ValidationError("username must be 1-64 characters".into()));
	}
	if !id_tag.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
		return Err(Error::ValidationError(
			"username may only contain letters, digits, '_', '.' and '-'".into(),
		));
	}
	Ok(())
}

pub fn validate_password(password: &str) -> GnResult<()> {
	if password.len() < 8 {
		return Err(Error::ValidationError("Password must be at least 8 characters".into()));
	}
	if password.trim().is_empty() {
		return Err(Error::ValidationError("Password cannot be empty or only whitespace".into()));
	}
	Ok(())
}

pub fn validate_email(email: &str) -> GnResult<()> {
	let valid = email
		.split_once('@')
		.is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
	if !valid || email.len() > 254 || email.chars().any(char::is_whitespace) {
		return Err(Error::ValidationError("invalid email address".into()));
	}
	Ok(())
}


// vim: ts=4
