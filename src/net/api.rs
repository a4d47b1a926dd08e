//! Backend adapter: one async call per REST resource.
//!
//! SYSTEM CONTEXT
//! ==============
//! Controllers in `dashboard` only ever talk to the [`Backend`] trait. The
//! production implementation, [`HttpBackend`], wraps a single pooled
//! `reqwest::Client`; tests substitute an in-memory fake.
//!
//! DESIGN
//! ======
//! Every call follows the same path: build a URL from path segments, send,
//! map non-2xx to `ApiError::Http` (pulling FastAPI's `detail` field when the
//! body has one), then hand the JSON body to the matching `decode_*` in
//! `types`. No call retries; the poll loop is the retry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Url, multipart};
use serde_json::Value;

use super::error::ApiError;
use super::types::{
    ChatReply, CollectionDetail, CollectionSummary, DocumentRecord, HealthReport, SearchQuery, SearchResult,
    UploadAck, decode_chat, decode_collection_detail, decode_collections, decode_documents, decode_health,
    decode_search, decode_upload_ack,
};
use crate::config::{DashboardConfig, Timeouts};
use crate::lang::Language;

/// Bytes handed to the transport per upload chunk.
pub const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Uploads carry whole documents and get a longer budget than polls.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Upload progress callback: `(bytes_sent, bytes_total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// A file queued for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Build an upload with a content type guessed from the extension.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename).to_owned();
        Self { filename, content_type, data }
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Everything the dashboard needs from the RAG backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /api/system-status`
    async fn system_status(&self) -> Result<HealthReport, ApiError>;

    /// `GET /api/documents`
    async fn documents(&self) -> Result<Vec<DocumentRecord>, ApiError>;

    /// `GET /api/collections`
    async fn collections(&self) -> Result<Vec<CollectionSummary>, ApiError>;

    /// `GET /api/collection/{name}?limit=N`
    async fn collection_detail(&self, name: &str, limit: u32) -> Result<CollectionDetail, ApiError>;

    /// `GET /api/search`
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ApiError>;

    /// `POST /api/chat` as a form with `message` and `language`.
    async fn chat(&self, message: &str, language: Language) -> Result<Vec<ChatReply>, ApiError>;

    /// Multipart upload to the configured upload path.
    async fn upload(&self, file: UploadFile, progress: ProgressFn) -> Result<UploadAck, ApiError>;

    /// `DELETE /api/documents/{file_id}`
    async fn delete_document(&self, file_id: &str) -> Result<(), ApiError>;

    /// `DELETE /api/collections/clear`
    async fn clear_all(&self) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// `reqwest`-backed [`Backend`].
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    upload_segments: Vec<String>,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the TLS backend fails to initialize.
    pub fn new(base_url: Url, upload_path: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()?;
        let upload_segments = upload_path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Ok(Self { client, base_url, upload_segments })
    }

    /// # Errors
    ///
    /// Same conditions as [`HttpBackend::new`].
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ApiError> {
        Self::new(config.backend_url.clone(), &config.upload_path, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Validation(format!("backend URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments.iter().map(AsRef::as_ref));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }
}

/// Send and return the JSON body, `Value::Null` for an empty 2xx body.
async fn send_json(request: RequestBuilder) -> Result<Value, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(ApiError::Http { status: status.as_u16(), detail: error_detail(&body) });
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&body)?)
}

/// Pull a human-readable message from an error body.
fn error_detail(body: &[u8]) -> Option<String> {
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Object(mut map) => match map.remove("detail").or_else(|| map.remove("error"))? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        },
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Stream `data` in fixed chunks, reporting progress as each one is taken.
fn progress_body(data: Vec<u8>, progress: ProgressFn) -> reqwest::Body {
    let total = data.len() as u64;
    let chunks: Vec<Vec<u8>> = data.chunks(UPLOAD_CHUNK_BYTES).map(<[u8]>::to_vec).collect();
    let mut sent = 0_u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        progress(sent, total);
        Ok::<_, std::io::Error>(chunk)
    });
    reqwest::Body::wrap_stream(stream)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn system_status(&self) -> Result<HealthReport, ApiError> {
        let url = self.endpoint(&["api", "system-status"])?;
        decode_health(send_json(self.request(Method::GET, url)).await?)
    }

    async fn documents(&self) -> Result<Vec<DocumentRecord>, ApiError> {
        let url = self.endpoint(&["api", "documents"])?;
        decode_documents(send_json(self.request(Method::GET, url)).await?)
    }

    async fn collections(&self) -> Result<Vec<CollectionSummary>, ApiError> {
        let url = self.endpoint(&["api", "collections"])?;
        decode_collections(send_json(self.request(Method::GET, url)).await?)
    }

    async fn collection_detail(&self, name: &str, limit: u32) -> Result<CollectionDetail, ApiError> {
        let mut url = self.endpoint(&["api", "collection", name])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        decode_collection_detail(send_json(self.request(Method::GET, url)).await?)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ApiError> {
        let mut url = self.endpoint(&["api", "search"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.query);
            pairs.append_pair("limit", &query.limit.to_string());
            if let Some(language) = &query.language {
                pairs.append_pair("language", language);
            }
            if let Some(sort) = &query.sort {
                pairs.append_pair("sort", sort);
            }
        }
        decode_search(send_json(self.request(Method::GET, url)).await?)
    }

    async fn chat(&self, message: &str, language: Language) -> Result<Vec<ChatReply>, ApiError> {
        let url = self.endpoint(&["api", "chat"])?;
        let form = [("message", message), ("language", language.code())];
        decode_chat(send_json(self.request(Method::POST, url).form(&form)).await?)
    }

    async fn upload(&self, file: UploadFile, progress: ProgressFn) -> Result<UploadAck, ApiError> {
        let url = self.endpoint(&self.upload_segments)?;
        let total = file.len();
        progress(0, total);

        let part = multipart::Part::stream_with_length(progress_body(file.data, progress), total)
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ApiError::Validation(format!("bad content type {:?}: {e}", file.content_type)))?;
        let form = multipart::Form::new().part("file", part);

        tracing::debug!(filename = %file.filename, bytes = total, %url, "uploading");
        let request = self.request(Method::POST, url).multipart(form).timeout(UPLOAD_TIMEOUT);
        decode_upload_ack(send_json(request).await?)
    }

    async fn delete_document(&self, file_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "documents", file_id])?;
        send_json(self.request(Method::DELETE, url)).await.map(|_| ())
    }

    async fn clear_all(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "collections", "clear"])?;
        send_json(self.request(Method::DELETE, url)).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
