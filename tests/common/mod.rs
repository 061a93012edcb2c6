//! Shared helpers for the HTTP integration tests.
//!
//! The router is driven through `tower::ServiceExt::oneshot` against an
//! in-memory `NoteStore`, so no database is needed.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header::CONTENT_TYPE};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use notes_api::models::{Note, NoteChanges};
use notes_api::repository::{NoteStore, StoreError, check_content, check_title};
use notes_api::service::NoteService;

#[derive(Default)]
struct Inner {
    notes: BTreeMap<i64, Note>,
    next_id: i64,
    last_tick: Option<DateTime<Utc>>,
}

impl Inner {
    /// Strictly increasing clock so ordering assertions never tie.
    fn tick(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_tick {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_tick = Some(now);
        now
    }
}

/// In-memory store with the same contract as the PostgreSQL repository.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().notes.len()
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn create(&self, title: &str, content: &str) -> Result<Note, StoreError> {
        check_title(title)?;
        check_content(content)?;

        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let now = inner.tick();
        let note = Note {
            id: inner.next_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn get(&self, id: i64) -> Result<Note, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.notes.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut notes: Vec<Note> = inner.notes.values().cloned().collect();
        notes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        Ok(notes)
    }

    async fn update(&self, id: i64, title: &str, content: &str) -> Result<Note, StoreError> {
        check_title(title)?;
        check_content(content)?;

        let mut inner = self.inner.lock().unwrap();
        if !inner.notes.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        let now = inner.tick();
        let note = inner.notes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        note.title = title.to_string();
        note.content = content.to_string();
        note.updated_at = now;
        Ok(note.clone())
    }

    async fn partial_update(&self, id: i64, changes: NoteChanges) -> Result<Note, StoreError> {
        if let Some(title) = &changes.title {
            check_title(title)?;
        }
        if let Some(content) = &changes.content {
            check_content(content)?;
        }

        let mut inner = self.inner.lock().unwrap();
        if !inner.notes.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        let now = inner.tick();
        let note = inner.notes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(title) = changes.title {
            note.title = title;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        note.updated_at = now;
        Ok(note.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .notes
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

/// Store whose backend is always unreachable.
pub struct BrokenStore;

fn unreachable_backend() -> StoreError {
    StoreError::Database("connection refused".into())
}

#[async_trait]
impl NoteStore for BrokenStore {
    async fn create(&self, _title: &str, _content: &str) -> Result<Note, StoreError> {
        Err(unreachable_backend())
    }

    async fn get(&self, _id: i64) -> Result<Note, StoreError> {
        Err(unreachable_backend())
    }

    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        Err(unreachable_backend())
    }

    async fn update(&self, _id: i64, _title: &str, _content: &str) -> Result<Note, StoreError> {
        Err(unreachable_backend())
    }

    async fn partial_update(&self, _id: i64, _changes: NoteChanges) -> Result<Note, StoreError> {
        Err(unreachable_backend())
    }

    async fn delete(&self, _id: i64) -> Result<(), StoreError> {
        Err(unreachable_backend())
    }
}

/// Build the application router over a fresh in-memory store.
pub fn build_test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = NoteService::new(store.clone());
    (notes_api::router(Arc::new(service)), store)
}

pub fn build_broken_app() -> Router {
    notes_api::router(Arc::new(NoteService::new(Arc::new(BrokenStore))))
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<&Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn timestamp(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp should be a string")
        .parse()
        .expect("timestamp should be RFC 3339")
}
