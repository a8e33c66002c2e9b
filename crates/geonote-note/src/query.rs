//! Read-side listings: bounding-box queries and per-owner lists

use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};

use geonote_core::OptionalAuth;
use geonote_types::types::{ApiResponse, BoundingBox, NoteView};

use crate::prelude::*;

/// # POST /api/notes/query
pub async fn post_query(
	State(app): State<App>,
	auth: OptionalAuth,
	Json(bbox): Json<BoundingBox>,
) -> GnResult<(StatusCode, Json<ApiResponse<Vec<NoteView>>>)> {
	let notes = app.geo.query_box(auth.actor(), &bbox).await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(notes))))
}

/// # GET /api/users/{owner}/notes
pub async fn get_notes_by_owner(
	State(app): State<App>,
	auth: OptionalAuth,
	Path(owner): Path<String>,
) -> GnResult<(StatusCode, Json<ApiResponse<Vec<NoteView>>>)> {
	let notes = app.geo.query_by_owner(auth.actor(), &owner).await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(notes))))
}

// vim: ts=4
