pub mod config;
pub mod dto;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

use axum::{Router, routing::get};

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use handlers::rest;
use service::NoteService;

/// Builds the HTTP router: the notes resource, the health probe and the API docs.
pub fn router(service: Arc<NoteService>) -> Router {
    Router::new()
        .route("/notes/", get(rest::get_all_notes).post(rest::create_note))
        .route(
            "/notes/{id}/",
            get(rest::get_one_note)
                .put(rest::update_note)
                .patch(rest::partial_update_note)
                .delete(rest::delete_note),
        )
        .route("/health/", get(rest::health))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", rest::ApiDoc::openapi()))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}
