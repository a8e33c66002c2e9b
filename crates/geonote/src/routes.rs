use axum::{
	Router, middleware,
	routing::{get, patch, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::prelude::*;
use crate::{auth, note};
use geonote_core::middleware::{optional_auth, require_auth};

pub fn init(app: App) -> Router {
	let protected_router = Router::new()
		.route("/api/auth/logout", post(auth::handler::post_logout))
		.route("/api/auth/session", get(auth::handler::get_session))
		.route("/api/notes", post(note::handler::post_note))
		.route(
			"/api/notes/{id}",
			patch(note::handler::patch_note).delete(note::handler::delete_note),
		)
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth));

	let public_router = Router::new()
		.route("/api/notes/{id}", get(note::handler::get_note))
		.route("/api/notes/query", post(note::query::post_query))
		.route("/api/users/{owner}/notes", get(note::query::get_notes_by_owner))
		.route_layer(middleware::from_fn_with_state(app.clone(), optional_auth));

	let auth_router = Router::new()
		.route("/api/auth/email-key", post(auth::register::post_email_key))
		.route("/api/auth/register", post(auth::register::post_register))
		.route("/api/auth/login", post(auth::handler::post_login));

	Router::new()
		.merge(auth_router)
		.merge(public_router)
		.merge(protected_router)
		.fallback_service(ServeDir::new(&*app.opts.dist_dir))
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}

// vim: ts=4
