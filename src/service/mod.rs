use crate::{
    dto::{CreateNoteRequest, NoteResponse, PatchNoteRequest, UpdateNoteRequest, ValidationErrors},
    models::{NoteChanges, TITLE_EMPTY_MESSAGE, content_problem, title_problem},
    repository::{NoteStore, StoreError},
};

use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid note: {0}")]
    Validation(ValidationErrors),

    #[error("note {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::ConstraintViolation { field, message } => {
                Self::Validation(ValidationErrors::single(field, message))
            }
            e @ StoreError::Database(_) => Self::Storage(e),
        }
    }
}

/// Checks a title before it is handed to the store.
///
/// Trimming only decides emptiness; the returned title is untouched.
pub fn validate_title(raw: Option<&str>) -> Result<&str, ValidationErrors> {
    let title = raw.ok_or_else(|| ValidationErrors::single("title", TITLE_EMPTY_MESSAGE))?;

    match title_problem(title) {
        Some(message) => Err(ValidationErrors::single("title", message)),
        None => Ok(title),
    }
}

/// Checks note content; an absent body is always acceptable.
pub fn validate_content(raw: Option<&str>) -> Result<(), ValidationErrors> {
    match raw.and_then(content_problem) {
        Some(message) => Err(ValidationErrors::single("content", message)),
        None => Ok(()),
    }
}

/// Joins two field checks so a rejected request reports every bad field.
fn both<A, B>(
    a: Result<A, ValidationErrors>,
    b: Result<B, ValidationErrors>,
) -> Result<(A, B), ServiceError> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(ServiceError::Validation(e)),
        (Err(mut a), Err(b)) => {
            a.merge(b);
            Err(ServiceError::Validation(a))
        }
    }
}

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub async fn create_note(
        &self,
        request: CreateNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        let (title, ()) = both(
            validate_title(request.title.as_deref()),
            validate_content(request.content.as_deref()),
        )?;
        let content = request.content.as_deref().unwrap_or_default();

        let note = self.store.create(title, content).await?;
        tracing::info!(note_id = note.id, "note created");

        Ok(note.into())
    }

    pub async fn get_one_note(&self, id: i64) -> Result<NoteResponse, ServiceError> {
        Ok(self.store.get(id).await?.into())
    }

    pub async fn get_all_notes(&self) -> Result<Vec<NoteResponse>, ServiceError> {
        let notes = self.store.list().await?;

        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }

    /// Full replace: `title` is required and a missing `content` becomes empty.
    pub async fn update_note(
        &self,
        id: i64,
        request: UpdateNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        let (title, ()) = both(
            validate_title(request.title.as_deref()),
            validate_content(request.content.as_deref()),
        )?;
        let content = request.content.as_deref().unwrap_or_default();

        let note = self.store.update(id, title, content).await?;
        tracing::info!(note_id = note.id, "note updated");

        Ok(note.into())
    }

    pub async fn partial_update_note(
        &self,
        id: i64,
        request: PatchNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        let (title, ()) = both(
            request
                .title
                .as_ref()
                .map(|raw| validate_title(raw.as_deref()))
                .transpose(),
            validate_content(request.content.as_deref()),
        )?;
        let changes = NoteChanges {
            title: title.map(str::to_string),
            content: request.content,
        };

        if changes.is_empty() {
            tracing::debug!(note_id = id, "partial update without fields, refreshing timestamp");
        }

        let note = self.store.partial_update(id, changes).await?;
        tracing::info!(note_id = note.id, "note partially updated");

        Ok(note.into())
    }

    pub async fn delete_note(&self, id: i64) -> Result<(), ServiceError> {
        self.store.delete(id).await?;
        tracing::info!(note_id = id, "note deleted");

        Ok(())
    }
}
