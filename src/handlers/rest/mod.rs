use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{
        CreateNoteRequest, ErrorResponse, HealthResponse, NoteResponse, PatchNoteRequest,
        UpdateNoteRequest, ValidationErrors,
    },
    service::{NoteService, ServiceError},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_notes,
        create_note,
        get_one_note,
        update_note,
        partial_update_note,
        delete_note,
        health
    ),
    components(schemas(
        NoteResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        PatchNoteRequest,
        ValidationErrors,
        ErrorResponse,
        HealthResponse
    )),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

/// Turns a failed service call into the matching HTTP response.
fn error_response(e: ServiceError, action: &str) -> Response {
    match e {
        ServiceError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        ServiceError::NotFound(_) => not_found(),
        ServiceError::Storage(e) => {
            tracing::error!("failed to {action}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Failed to {action}"))),
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found."))).into_response()
}

fn bad_body(rejection: &JsonRejection) -> Response {
    tracing::debug!("rejected request body: {rejection}");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(rejection.body_text())),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/notes/",
    operation_id = "listNotes",
    summary = "List notes",
    description = "Retrieve a list of all notes ordered by last updated.",
    responses(
        (status = 200, description = "All notes, most recently updated first", body = Vec<NoteResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(State(service): State<Arc<NoteService>>) -> Response {
    match service.get_all_notes().await {
        Ok(notes) => (StatusCode::OK, Json(notes)).into_response(),
        Err(e) => error_response(e, "list notes"),
    }
}

#[utoipa::path(
    post,
    path = "/notes/",
    operation_id = "createNote",
    summary = "Create a note",
    description = "Create a new note with title and optional content.",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Invalid note", body = ValidationErrors),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_body(&rejection),
    };

    match service.create_note(payload).await {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => error_response(e, "create note"),
    }
}

#[utoipa::path(
    get,
    path = "/notes/{id}/",
    operation_id = "retrieveNote",
    summary = "Retrieve a note",
    description = "Get a single note by its ID.",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_one_note(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return not_found();
    };

    match service.get_one_note(id).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => error_response(e, "get note"),
    }
}

#[utoipa::path(
    put,
    path = "/notes/{id}/",
    operation_id = "updateNote",
    summary = "Update a note",
    description = "Update all fields of a note.",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note replaced successfully", body = NoteResponse),
        (status = 400, description = "Invalid note", body = ValidationErrors),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return not_found();
    };
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_body(&rejection),
    };

    match service.update_note(id, payload).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => error_response(e, "update note"),
    }
}

#[utoipa::path(
    patch,
    path = "/notes/{id}/",
    operation_id = "partialUpdateNote",
    summary = "Partially update a note",
    description = "Update one or more fields of a note.",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = PatchNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 400, description = "Invalid note", body = ValidationErrors),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn partial_update_note(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PatchNoteRequest>, JsonRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return not_found();
    };
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_body(&rejection),
    };

    match service.partial_update_note(id, payload).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => error_response(e, "update note"),
    }
}

#[utoipa::path(
    delete,
    path = "/notes/{id}/",
    operation_id = "deleteNote",
    summary = "Delete a note",
    description = "Delete a note by its ID.",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted successfully"),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let Ok(Path(id)) = id else {
        return not_found();
    };

    match service.delete_note(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e, "delete note"),
    }
}

#[utoipa::path(
    get,
    path = "/health/",
    operation_id = "health",
    summary = "Health check",
    description = "Report that the server is up.",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse)
    ),
    tag = "health"
)]
#[debug_handler]
pub async fn health() -> Response {
    (
        StatusCode::OK,
        Json(HealthResponse {
            message: "Server is up!".to_string(),
        }),
    )
        .into_response()
}
