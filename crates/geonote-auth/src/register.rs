//! Registration and email verification handlers

use axum::{
	extract::{Json, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use geonote_core::storage::bounded;
use geonote_types::auth_adapter::CreateUserData;
use geonote_types::types::ApiResponse;
use geonote_types::utils::{validate_email, validate_id_tag, validate_password};

use crate::prelude::*;

/// # POST /api/auth/email-key
#[derive(Deserialize)]
pub struct EmailKeyReq {
	email: String,
}

/// Sends a fresh verification code to an email address
pub async fn post_email_key(
	State(app): State<App>,
	Json(req): Json<EmailKeyReq>,
) -> GnResult<(StatusCode, Json<ApiResponse<()>>)> {
	let email = req.email.trim();
	validate_email(email)?;

	let code = bounded(
		app.opts.storage_timeout,
		"create_verification_code",
		app.auth_adapter.create_verification_code(email),
	)
	.await?;
	if let Err(err) = app.mailer.send_verification_code(email, &code).await {
		warn!(email = %email, "Failed to deliver verification code: {}", err);
		return Err(Error::ServiceUnavailable("could not deliver verification code".into()));
	}
	info!(email = %email, "Verification code sent");

	Ok((StatusCode::OK, Json(ApiResponse::new(()))))
}

/// # POST /api/auth/register
#[derive(Deserialize)]
pub struct RegisterReq {
	username: String,
	password: String,
	email: Option<String>,
	email_key: Option<String>,
}

#[skip_serializing_none]
#[derive(Serialize)]
pub struct Registered {
	username: String,
	email: Option<String>,
}

pub async fn post_register(
	State(app): State<App>,
	Json(req): Json<RegisterReq>,
) -> GnResult<(StatusCode, Json<ApiResponse<Registered>>)> {
	validate_id_tag(&req.username)?;
	validate_password(&req.password)?;

	let email = req.email.as_deref().map(str::trim).filter(|email| !email.is_empty());
	let email_key = req.email_key.as_deref().map(str::trim).filter(|key| !key.is_empty());
	if let Some(email) = email {
		validate_email(email)?;
	}

	match (email, email_key) {
		(Some(_), Some(_)) => {}
		(None, Some(_)) => {
			return Err(Error::ValidationError("email_key requires an email".into()));
		}
		(_, None) if app.opts.require_email_verification => {
			return Err(Error::ValidationError("email and email_key are required".into()));
		}
		(_, None) => {}
	}

	let timeout = app.opts.storage_timeout;
	if bounded(timeout, "user_exists", app.auth_adapter.user_exists(&req.username)).await? {
		return Err(Error::Conflict("username already taken".into()));
	}

	// The adapter consumes the code in the same transaction as the insert
	let data = CreateUserData {
		id_tag: &req.username,
		password: &req.password,
		email,
		email_code: email_key,
	};
	bounded(timeout, "create_user", app.auth_adapter.create_user(data)).await?;
	info!(username = %req.username, "User registered");

	let registered = Registered { username: req.username, email: email.map(str::to_string) };
	Ok((StatusCode::CREATED, Json(ApiResponse::new(registered))))
}

// vim: ts=4
