use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use geonote_core::storage::bounded;
use geonote_core::{Auth, DeleteOutcome, NewNote, OptionalAuth};
use geonote_types::types::{ApiResponse, Coords, NoteView, Visibility};

use crate::prelude::*;

/// Builds coordinates from optional request fields. Both or neither must be given.
fn coords_from(longitude: Option<f64>, latitude: Option<f64>) -> GnResult<Option<Coords>> {
	match (longitude, latitude) {
		(Some(longitude), Some(latitude)) => Ok(Some(Coords::new(longitude, latitude))),
		(None, None) => Ok(None),
		_ => Err(Error::ValidationError("longitude and latitude must be given together".into())),
	}
}

/// # POST /api/notes
#[derive(Debug, Deserialize)]
pub struct CreateNoteReq {
	text: String,
	longitude: Option<f64>,
	#[serde(alias = "lattitude")]
	latitude: Option<f64>,
	visibility: Option<Visibility>,
	/// Older clients send a flag instead of `visibility`
	public: Option<bool>,
	#[serde(default)]
	grantees: Vec<Box<str>>,
	parent_id: Option<NoteId>,
}

impl CreateNoteReq {
	fn visibility(&self) -> Visibility {
		match (self.visibility, self.public) {
			(Some(visibility), _) => visibility,
			(None, Some(true)) => Visibility::Public,
			(None, _) => Visibility::Private,
		}
	}
}

/// Every grantee of a new private root note must be a registered user
async fn check_grantees(app: &App, owner: &str, grantees: &[Box<str>]) -> GnResult<()> {
	for grantee in grantees.iter().filter(|g| g.as_ref() != owner) {
		let exists =
			bounded(app.opts.storage_timeout, "user_exists", app.auth_adapter.user_exists(grantee))
				.await?;
		if !exists {
			return Err(Error::ValidationError(format!("unknown grantee: {}", grantee)));
		}
	}
	Ok(())
}

pub async fn post_note(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(req): Json<CreateNoteReq>,
) -> GnResult<(StatusCode, Json<ApiResponse<NoteView>>)> {
	let coords = coords_from(req.longitude, req.latitude)?;
	let visibility = req.visibility();

	// Replies take their audience from the parent
	if req.parent_id.is_none() && visibility == Visibility::Private {
		check_grantees(&app, &auth.id_tag, &req.grantees).await?;
	}

	let note = app
		.notes
		.create(&auth.id_tag, &NewNote {
			text: &req.text,
			coords,
			visibility,
			grantees: &req.grantees,
			parent_id: req.parent_id,
		})
		.await?;

	Ok((StatusCode::CREATED, Json(ApiResponse::new(note))))
}

/// # GET /api/notes/{id}
pub async fn get_note(
	State(app): State<App>,
	auth: OptionalAuth,
	Path(note_id): Path<NoteId>,
) -> GnResult<(StatusCode, Json<ApiResponse<NoteView>>)> {
	let note = app.notes.get(auth.actor(), note_id).await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(note))))
}

/// # PATCH /api/notes/{id}
#[derive(Debug, Deserialize)]
pub struct PatchNoteReq {
	text: String,
	longitude: Option<f64>,
	#[serde(alias = "lattitude")]
	latitude: Option<f64>,
}

pub async fn patch_note(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(note_id): Path<NoteId>,
	Json(req): Json<PatchNoteReq>,
) -> GnResult<(StatusCode, Json<ApiResponse<NoteView>>)> {
	let coords = coords_from(req.longitude, req.latitude)?;
	let note = app.notes.update(&auth.id_tag, note_id, &req.text, coords).await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(note))))
}

/// # DELETE /api/notes/{id}
#[derive(Serialize)]
pub struct Deleted {
	id: NoteId,
	/// `redacted` when replies keep the note in place, `removed` otherwise
	outcome: &'static str,
}

pub async fn delete_note(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(note_id): Path<NoteId>,
) -> GnResult<(StatusCode, Json<ApiResponse<Deleted>>)> {
	let outcome = match app.notes.delete(&auth.id_tag, note_id).await? {
		DeleteOutcome::Redacted => "redacted",
		DeleteOutcome::Removed => "removed",
	};

	Ok((StatusCode::OK, Json(ApiResponse::new(Deleted { id: note_id, outcome }))))
}


// vim: ts=4
