//! Error type shared by every geonote crate.

use axum::{
	Json,
	http::{StatusCode, header},
	response::{IntoResponse, Response},
};

pub type GnResult<T> = std::result::Result<T, Error>;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

/// Why a request could not be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
	/// No token was presented
	Missing,
	/// Signature, encoding or claim shape is invalid
	Malformed,
	/// Token is past its expiry
	Expired,
	/// Token was revoked (logout)
	Revoked,
	/// Username or password did not match
	InvalidCredentials,
}

impl AuthError {
	fn code(self) -> &'static str {
		match self {
			AuthError::Missing => "E-AUTH-MISSING",
			AuthError::Malformed => "E-AUTH-MALFORMED",
			AuthError::Expired => "E-AUTH-EXPIRED",
			AuthError::Revoked => "E-AUTH-REVOKED",
			AuthError::InvalidCredentials => "E-AUTH-CREDENTIALS",
		}
	}

	/// The client should drop its cached token
	pub fn clears_token(self) -> bool {
		matches!(self, AuthError::Expired | AuthError::Revoked)
	}
}

impl std::fmt::Display for AuthError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let msg = match self {
			AuthError::Missing => "missing session token",
			AuthError::Malformed => "malformed session token",
			AuthError::Expired => "session token expired",
			AuthError::Revoked => "session token revoked",
			AuthError::InvalidCredentials => "invalid username or password",
		};
		f.write_str(msg)
	}
}

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	Unauthorized(AuthError),
	ValidationError(String),
	Conflict(String),
	DbError,
	Timeout,
	ServiceUnavailable(String),
	ConfigError(String),
	Internal(String),
	Parse,

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<AuthError> for Error {
	fn from(err: AuthError) -> Self {
		Self::Unauthorized(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized(err) => write!(f, "unauthorized: {}", err),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Conflict(msg) => write!(f, "conflict: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::Timeout => write!(f, "storage timeout"),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Parse => write!(f, "parse error"),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let (status, code, message) = match &self {
			Error::NotFound => (StatusCode::NOT_FOUND, "E-NOT-FOUND", "Not found".to_string()),
			Error::PermissionDenied => {
				(StatusCode::FORBIDDEN, "E-PERMISSION-DENIED", "Permission denied".to_string())
			}
			Error::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err.code(), err.to_string()),
			Error::ValidationError(msg) => (StatusCode::BAD_REQUEST, "E-VALIDATION", msg.clone()),
			Error::Conflict(msg) => (StatusCode::CONFLICT, "E-CONFLICT", msg.clone()),
			Error::Timeout => {
				(StatusCode::GATEWAY_TIMEOUT, "E-TIMEOUT", "Storage timed out".to_string())
			}
			Error::ServiceUnavailable(msg) => {
				(StatusCode::SERVICE_UNAVAILABLE, "E-UNAVAILABLE", msg.clone())
			}
			Error::DbError
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::Parse
			| Error::Io(_) => {
				tracing::error!("Internal error: {}", self);
				(StatusCode::INTERNAL_SERVER_ERROR, "E-INTERNAL", "Internal error".to_string())
			}
		};

		let body = serde_json::json!({
			"error": {
				"code": code,
				"message": message,
			}
		});
		let mut response = (status, Json(body)).into_response();

		if let Error::Unauthorized(err) = self {
			if err.clears_token() {
				if let Ok(val) = clear_cookie_header().parse() {
					response.headers_mut().insert(header::SET_COOKIE, val);
				}
			}
		}

		response
	}
}

/// `Set-Cookie` value that removes the session cookie from the client
pub fn clear_cookie_header() -> String {
	format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}


// vim: ts=4
