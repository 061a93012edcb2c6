mod embedded;

use embedded::migrations;

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Row, error::SqlState};

use crate::models::{
    NULL_CHARACTER_MESSAGE, Note, NoteChanges, TITLE_EMPTY_MESSAGE, TITLE_TOO_LONG_MESSAGE,
    content_problem, title_problem,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("note {0} not found")]
    NotFound(i64),

    #[error("constraint violated on '{field}': {message}")]
    ConstraintViolation {
        field: &'static str,
        message: &'static str,
    },

    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        match constraint_message(&e) {
            Some((field, message)) => Self::ConstraintViolation { field, message },
            None => Self::Database(Box::new(e)),
        }
    }
}

/// Maps a database-side rejection of a note row to the offending field and message.
fn constraint_message(e: &tokio_postgres::Error) -> Option<(&'static str, &'static str)> {
    let code = e.code()?;

    if *code == SqlState::STRING_DATA_RIGHT_TRUNCATION {
        return Some(("title", TITLE_TOO_LONG_MESSAGE));
    }
    if *code == SqlState::NOT_NULL_VIOLATION {
        return Some(("title", TITLE_EMPTY_MESSAGE));
    }
    // The server does not say which parameter held the NUL byte.
    if *code == SqlState::CHARACTER_NOT_IN_REPERTOIRE {
        return Some(("non_field_errors", NULL_CHARACTER_MESSAGE));
    }
    if *code == SqlState::CHECK_VIOLATION {
        let constraint = e.as_db_error().and_then(|db| db.constraint());
        if constraint == Some("notes_title_not_blank") {
            return Some(("title", TITLE_EMPTY_MESSAGE));
        }
    }

    None
}

/// Storage-boundary check applied before every write.
pub fn check_title(title: &str) -> Result<(), StoreError> {
    match title_problem(title) {
        Some(message) => Err(StoreError::ConstraintViolation {
            field: "title",
            message,
        }),
        None => Ok(()),
    }
}

pub fn check_content(content: &str) -> Result<(), StoreError> {
    match content_problem(content) {
        Some(message) => Err(StoreError::ConstraintViolation {
            field: "content",
            message,
        }),
        None => Ok(()),
    }
}

/// Durable CRUD over notes.
///
/// Every method acts on exactly one note and has finished writing by the time
/// it returns.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn create(&self, title: &str, content: &str) -> Result<Note, StoreError>;

    async fn get(&self, id: i64) -> Result<Note, StoreError>;

    /// All notes, most recently updated first.
    async fn list(&self) -> Result<Vec<Note>, StoreError>;

    /// Replaces both title and content.
    async fn update(&self, id: i64, title: &str, content: &str) -> Result<Note, StoreError>;

    async fn partial_update(&self, id: i64, changes: NoteChanges) -> Result<Note, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

pub struct Repository {
    client: Client,
}

impl Repository {
    pub async fn new(database_dsn: &str) -> Result<Self, tokio_postgres::Error> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), refinery::Error> {
        let migrations_report = migrations::runner().run_async(&mut self.client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

fn note_from_row(row: &Row) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl NoteStore for Repository {
    async fn create(&self, title: &str, content: &str) -> Result<Note, StoreError> {
        check_title(title)?;
        check_content(content)?;

        let row = self
            .client
            .query_one(
                "INSERT INTO notes (title, content) VALUES ($1, $2) \
                 RETURNING id, title, content, created_at, updated_at",
                &[&title, &content],
            )
            .await?;

        Ok(note_from_row(&row))
    }

    async fn get(&self, id: i64) -> Result<Note, StoreError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, title, content, created_at, updated_at FROM notes WHERE id = $1",
                &[&id],
            )
            .await?;

        row.as_ref()
            .map(note_from_row)
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT id, title, content, created_at, updated_at FROM notes \
                 ORDER BY updated_at DESC, created_at DESC, id DESC",
                &[],
            )
            .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn update(&self, id: i64, title: &str, content: &str) -> Result<Note, StoreError> {
        check_title(title)?;
        check_content(content)?;

        let row = self
            .client
            .query_opt(
                "UPDATE notes SET title = $1, content = $2, updated_at = now() \
                 WHERE id = $3 RETURNING id, title, content, created_at, updated_at",
                &[&title, &content, &id],
            )
            .await?;

        row.as_ref()
            .map(note_from_row)
            .ok_or(StoreError::NotFound(id))
    }

    async fn partial_update(&self, id: i64, changes: NoteChanges) -> Result<Note, StoreError> {
        if let Some(title) = &changes.title {
            check_title(title)?;
        }
        if let Some(content) = &changes.content {
            check_content(content)?;
        }

        let row = self
            .client
            .query_opt(
                "UPDATE notes SET title = COALESCE($1, title), \
                 content = COALESCE($2, content), updated_at = now() \
                 WHERE id = $3 RETURNING id, title, content, created_at, updated_at",
                &[&changes.title.as_deref(), &changes.content.as_deref(), &id],
            )
            .await?;

        row.as_ref()
            .map(note_from_row)
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let rows = self
            .client
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        if rows == 1 {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }
}
