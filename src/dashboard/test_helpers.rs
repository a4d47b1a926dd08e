//! Scripted in-memory backend for controller tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::Dashboard;
use crate::config::QueryLimits;
use crate::lang::Language;
use crate::net::api::{Backend, ProgressFn, UploadFile};
use crate::net::error::ApiError;
use crate::net::types::{
    ChatReply, CollectionDetail, CollectionSummary, DocumentRecord, DocumentStatus, HealthReport, SearchQuery,
    SearchResult, UploadAck,
};

/// FIFO of scripted replies; an empty queue answers with a default.
pub(crate) struct Script<T> {
    queue: Mutex<VecDeque<(Duration, Result<T, ApiError>)>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self { queue: Mutex::new(VecDeque::new()) }
    }
}

impl<T> Script<T> {
    pub(crate) fn push(&self, delay: Duration, result: Result<T, ApiError>) {
        self.queue.lock().unwrap().push_back((delay, result));
    }

    async fn next_or(&self, fallback: impl FnOnce() -> T) -> Result<T, ApiError> {
        let scripted = self.queue.lock().unwrap().pop_front();
        match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(fallback()),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    calls: Mutex<Vec<String>>,
    pub(crate) health: Script<HealthReport>,
    pub(crate) documents: Script<Vec<DocumentRecord>>,
    pub(crate) collections: Script<Vec<CollectionSummary>>,
    pub(crate) detail: Script<CollectionDetail>,
    pub(crate) search: Script<Vec<SearchResult>>,
    pub(crate) chat: Script<Vec<ChatReply>>,
    pub(crate) upload: Script<UploadAck>,
    pub(crate) delete: Script<()>,
    pub(crate) clear: Script<()>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    /// Every call in order, e.g. `["documents", "upload:a.pdf"]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose name is exactly `name` or starts with `name:`.
    pub fn count(&self, name: &str) -> usize {
        let prefix = format!("{name}:");
        self.calls()
            .iter()
            .filter(|c| *c == name || c.starts_with(&prefix))
            .count()
    }

    pub fn documents_reply(&self, delay: Duration, result: Result<Vec<DocumentRecord>, ApiError>) {
        self.documents.push(delay, result);
    }

    pub fn search_reply(&self, delay: Duration, result: Result<Vec<SearchResult>, ApiError>) {
        self.search.push(delay, result);
    }

    pub fn chat_reply(&self, delay: Duration, result: Result<Vec<ChatReply>, ApiError>) {
        self.chat.push(delay, result);
    }

    pub fn upload_reply(&self, result: Result<UploadAck, ApiError>) {
        self.upload.push(Duration::ZERO, result);
    }
}

pub(crate) fn dashboard_with(fake: &Arc<FakeBackend>) -> Arc<Dashboard> {
    let backend: Arc<dyn Backend> = fake.clone();
    Arc::new(Dashboard::new(backend, QueryLimits::default()))
}

pub(crate) fn doc(id: &str) -> DocumentRecord {
    DocumentRecord {
        file_id: id.to_owned(),
        filename: format!("{id}.pdf"),
        status: DocumentStatus::Completed,
        chunk_count: Some(1),
        size_bytes: None,
        uploaded_at: None,
        processing_time: None,
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn system_status(&self) -> Result<HealthReport, ApiError> {
        self.record("health");
        self.health.next_or(HealthReport::default).await
    }

    async fn documents(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        self.record("documents");
        self.documents.next_or(Vec::new).await
    }

    async fn collections(&self) -> Result<Vec<CollectionSummary>, ApiError> {
        self.record("collections");
        self.collections.next_or(Vec::new).await
    }

    async fn collection_detail(&self, name: &str, limit: u32) -> Result<CollectionDetail, ApiError> {
        self.record(format!("collection:{name}:{limit}"));
        let name = name.to_owned();
        self.detail
            .next_or(|| CollectionDetail { name, ..CollectionDetail::default() })
            .await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ApiError> {
        self.record(format!("search:{}:{}", query.query, query.limit));
        self.search.next_or(Vec::new).await
    }

    async fn chat(&self, message: &str, language: Language) -> Result<Vec<ChatReply>, ApiError> {
        self.record(format!("chat:{language}:{message}"));
        self.chat.next_or(|| vec![ChatReply::text("ok")]).await
    }

    async fn upload(&self, file: UploadFile, progress: ProgressFn) -> Result<UploadAck, ApiError> {
        self.record(format!("upload:{}", file.filename));
        let total = file.len();
        progress(total / 2, total);
        let result = self
            .upload
            .next_or(|| UploadAck {
                file_id: format!("id-{}", file.filename),
                filename: Some(file.filename.clone()),
                status: DocumentStatus::Processing,
                message: None,
            })
            .await;
        if result.is_ok() {
            progress(total, total);
        }
        result
    }

    async fn delete_document(&self, file_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete:{file_id}"));
        self.delete.next_or(|| ()).await
    }

    async fn clear_all(&self) -> Result<(), ApiError> {
        self.record("clear");
        self.clear.next_or(|| ()).await
    }
}
