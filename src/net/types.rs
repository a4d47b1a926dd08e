//! Backend wire types and envelope normalization.
//!
//! DESIGN
//! ======
//! The backend is loose about shapes: list endpoints answer with either a
//! bare array or an object wrapping it, counts arrive as numbers, numeric
//! strings or the literal `"Error"`, and search hits carry either a `score`
//! or a `distance`. Everything is decoded from `serde_json::Value` through
//! the `decode_*` functions below so callers only ever see one semantic
//! shape per resource.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::ApiError;

// =============================================================================
// HEALTH
// =============================================================================

/// Reported status of one backend service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    #[default]
    Unknown,
    Error,
}

impl HealthStatus {
    fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("healthy") => Self::Healthy,
            Some("unhealthy") => Self::Unhealthy,
            Some("error") => Self::Error,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Unknown => "unknown",
            Self::Error => "error",
        }
    }
}

impl<'de> Deserialize<'de> for HealthStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_wire(raw.as_deref()))
    }
}

/// Health of one named backend service.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServiceHealth {
    pub name: String,
    pub status: HealthStatus,
    pub response_time_ms: Option<u64>,
    pub error: Option<String>,
}

/// Collection-wide health derived from every service's status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverallHealth {
    Healthy,
    Partial,
    Unhealthy,
    Unknown,
}

/// Per-service health keyed by service name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HealthReport {
    pub services: BTreeMap<String, ServiceHealth>,
}

impl HealthReport {
    #[must_use]
    pub fn healthy_count(&self) -> usize {
        self.services
            .values()
            .filter(|s| s.status == HealthStatus::Healthy)
            .count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.services.len()
    }

    /// All healthy → healthy; some → partial; none → unhealthy.
    /// An empty report carries no information and is unknown.
    #[must_use]
    pub fn overall(&self) -> OverallHealth {
        let healthy = self.healthy_count();
        match (healthy, self.total()) {
            (_, 0) => OverallHealth::Unknown,
            (h, t) if h == t => OverallHealth::Healthy,
            (0, _) => OverallHealth::Unhealthy,
            _ => OverallHealth::Partial,
        }
    }
}

#[derive(Deserialize)]
struct RawServiceHealth {
    #[serde(default)]
    status: HealthStatus,
    #[serde(default, alias = "response_time", deserialize_with = "lenient_u64")]
    response_time_ms: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Processing state of an ingested document.
///
/// `Uploading` only ever exists locally while bytes are in flight; every
/// later transition is reported by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Completed,
    Failed,
    #[default]
    Unknown,
}

impl DocumentStatus {
    fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("uploading") => Self::Uploading,
            Some("processing") => Self::Processing,
            Some("completed") => Self::Completed,
            Some("failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    /// No further backend transitions are expected.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl<'de> Deserialize<'de> for DocumentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from_wire(raw.as_deref()))
    }
}

/// One ingested document as listed by `/api/documents`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub file_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default, alias = "chunks", alias = "chunks_count", deserialize_with = "lenient_u64")]
    pub chunk_count: Option<u64>,
    #[serde(default, alias = "size", alias = "file_size", deserialize_with = "lenient_u64")]
    pub size_bytes: Option<u64>,
    #[serde(default, alias = "upload_time")]
    pub uploaded_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub processing_time: Option<String>,
}

/// Upload acknowledgment from `/api/upload`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadAck {
    pub file_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Read-only projection of one vector-store collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string_or_empty")]
    pub id: String,
    /// `None` when the backend could not count the collection.
    #[serde(default, alias = "count", deserialize_with = "lenient_u64")]
    pub document_count: Option<u64>,
    #[serde(default, deserialize_with = "strings_only")]
    pub sample_documents: Vec<String>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// One stored chunk inside a collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectionEntry {
    pub id: String,
    pub content: String,
    pub metadata: Value,
}

/// Detailed view of a collection from `/api/collection/{name}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CollectionDetail {
    pub name: String,
    pub count: Option<u64>,
    pub has_embeddings: bool,
    pub entries: Vec<CollectionEntry>,
}

#[derive(Deserialize)]
struct RawCollectionDetail {
    name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    count: Option<u64>,
    #[serde(default)]
    has_embeddings: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    documents: Vec<Option<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    metadatas: Vec<Value>,
}

// =============================================================================
// SEARCH
// =============================================================================

/// Parameters for `/api/search`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub limit: u32,
    pub language: Option<String>,
    pub sort: Option<String>,
}

/// One search hit, normalized.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchResult {
    pub content: String,
    /// Relevance in `[0, 1]`; `None` when the backend sent neither score nor distance.
    pub score: Option<f64>,
    pub document_ref: String,
    pub chunk_index: Option<u64>,
}

#[derive(Deserialize)]
struct RawSearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    content: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default, alias = "document", alias = "filename")]
    document_ref: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    chunk_index: Option<u64>,
    #[serde(default)]
    metadata: Value,
}

impl From<RawSearchResult> for SearchResult {
    fn from(raw: RawSearchResult) -> Self {
        let score = raw
            .score
            .or_else(|| raw.distance.map(|d| 1.0 - d))
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 1.0));

        let document_ref = raw
            .document_ref
            .or_else(|| metadata_str(&raw.metadata, "filename"))
            .or_else(|| metadata_str(&raw.metadata, "file_id"))
            .unwrap_or_else(|| "Unknown".to_owned());

        let chunk_index = raw
            .chunk_index
            .or_else(|| metadata_u64(&raw.metadata, "chunk_index"))
            .or_else(|| metadata_u64(&raw.metadata, "chunk_id"));

        Self { content: raw.content, score, document_ref, chunk_index }
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// One item of a chat response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub custom: Option<Value>,
}

impl ChatReply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    /// Text shown in the chat panel for this item.
    #[must_use]
    pub fn display_text(&self) -> String {
        if let Some(text) = self.text.as_ref().or(self.message.as_ref()) {
            return text.clone();
        }
        if let Some(image) = &self.image {
            return format!("[Image: {image}]");
        }
        if let Some(custom) = &self.custom {
            return serde_json::to_string_pretty(custom).unwrap_or_else(|_| custom.to_string());
        }
        "No response".to_owned()
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a list endpoint that answers either `[...]` or `{ key: [...] }`.
///
/// A wrapper object without `key` is treated as an empty list.
///
/// # Errors
///
/// Returns `ApiError::Decode` for any other shape or malformed items.
pub fn decode_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => match map.remove(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(inner @ Value::Array(_)) => Ok(serde_json::from_value(inner)?),
            Some(other) => Err(ApiError::Decode(format!("`{key}` is {}, expected an array", type_name(&other)))),
        },
        other => Err(ApiError::Decode(format!("expected an array or object, got {}", type_name(&other)))),
    }
}

/// # Errors
///
/// Returns `ApiError::Decode` unless the body is an object of service entries.
pub fn decode_health(value: Value) -> Result<HealthReport, ApiError> {
    if !value.is_object() {
        return Err(ApiError::Decode(format!("health report must be an object, got {}", type_name(&value))));
    }
    let raw: BTreeMap<String, RawServiceHealth> = serde_json::from_value(value)?;
    let services = raw
        .into_iter()
        .map(|(name, svc)| {
            let health = ServiceHealth {
                name: name.clone(),
                status: svc.status,
                response_time_ms: svc.response_time_ms,
                error: svc.error,
            };
            (name, health)
        })
        .collect();
    Ok(HealthReport { services })
}

/// # Errors
///
/// Returns `ApiError::Decode` on an unexpected envelope or malformed record.
pub fn decode_documents(value: Value) -> Result<Vec<DocumentRecord>, ApiError> {
    decode_list(value, "documents")
}

/// # Errors
///
/// Returns `ApiError::Decode` on an unexpected envelope or malformed summary.
pub fn decode_collections(value: Value) -> Result<Vec<CollectionSummary>, ApiError> {
    decode_list(value, "collections")
}

/// Zip the parallel `ids` / `documents` / `metadatas` arrays into entries.
///
/// # Errors
///
/// Returns `ApiError::Decode` if the body is not a collection-detail object.
pub fn decode_collection_detail(value: Value) -> Result<CollectionDetail, ApiError> {
    let raw: RawCollectionDetail = serde_json::from_value(value)?;
    let entries = raw
        .ids
        .iter()
        .enumerate()
        .map(|(i, id)| CollectionEntry {
            id: id.clone(),
            content: raw.documents.get(i).cloned().flatten().unwrap_or_default(),
            metadata: raw.metadatas.get(i).cloned().unwrap_or(Value::Null),
        })
        .collect();
    Ok(CollectionDetail { name: raw.name, count: raw.count, has_embeddings: raw.has_embeddings, entries })
}

/// # Errors
///
/// Returns `ApiError::Decode` on an unexpected envelope or malformed hit.
pub fn decode_search(value: Value) -> Result<Vec<SearchResult>, ApiError> {
    let raw: Vec<RawSearchResult> = decode_list(value, "results")?;
    Ok(raw.into_iter().map(SearchResult::from).collect())
}

/// Accepts `{responses: [...]}`, `{response: "..."}` or a bare item array.
///
/// # Errors
///
/// Returns `ApiError::Decode` for any other shape.
pub fn decode_chat(value: Value) -> Result<Vec<ChatReply>, ApiError> {
    if let Some(text) = value.get("response").and_then(Value::as_str) {
        return Ok(vec![ChatReply::text(text)]);
    }
    decode_list(value, "responses")
}

/// # Errors
///
/// Returns `ApiError::Decode` if the acknowledgment carries no `file_id`.
pub fn decode_upload_ack(value: Value) -> Result<UploadAck, ApiError> {
    Ok(serde_json::from_value(value)?)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn metadata_str(metadata: &Value, key: &str) -> Option<String> {
    match metadata.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn metadata_u64(metadata: &Value, key: &str) -> Option<u64> {
    metadata.get(key).and_then(value_as_u64)
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let rounded = f.round() as u64;
                    rounded
                })
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

// =============================================================================
// LENIENT FIELD DESERIALIZERS
// =============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Numbers, numeric strings, or anything else as `None` (e.g. `"Error"`).
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_u64(&value))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

fn strings_only<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
