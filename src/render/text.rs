//! Plain-text summaries for the CLI.

use std::fmt::Write;

use super::{PREVIEW_CHARS, format_file_size, format_score, format_timestamp, truncate_chars};
use crate::net::types::{CollectionDetail, CollectionSummary, DocumentRecord, HealthReport, OverallHealth};
use crate::state::SearchResults;
use crate::state::chat::{ChatMessage, Sender};
use crate::state::notifications::Notifications;
use crate::state::snapshot::{Snapshot, SnapshotView};
use crate::state::uploads::{UploadList, UploadOutcome};

fn snapshot_text<T>(snapshot: &Snapshot<T>, what: &str, body: impl FnOnce(&T) -> String) -> String {
    match snapshot.view() {
        SnapshotView::Loading => format!("{what}: not loaded\n"),
        SnapshotView::Ready(data) => body(data),
        SnapshotView::Stale(data, err) => format!("warning: showing stale {what} ({err})\n{}", body(data)),
        SnapshotView::Failed(err) => format!("error: failed to load {what}: {err}\n"),
    }
}

#[must_use]
pub fn health_text(health: &Snapshot<HealthReport>) -> String {
    snapshot_text(health, "system status", |report| {
        let overall = match report.overall() {
            OverallHealth::Healthy => "healthy",
            OverallHealth::Partial => "partial",
            OverallHealth::Unhealthy => "unhealthy",
            OverallHealth::Unknown => "unknown",
        };
        let mut out = format!(
            "{}/{} Services Healthy ({overall})\n",
            report.healthy_count(),
            report.total()
        );
        for svc in report.services.values() {
            let _ = write!(out, "  {:<20} {:<10}", svc.name, svc.status.label());
            if let Some(ms) = svc.response_time_ms {
                let _ = write!(out, " {ms} ms");
            }
            if let Some(err) = &svc.error {
                let _ = write!(out, " {err}");
            }
            out.push('\n');
        }
        out
    })
}

fn document_line(doc: &DocumentRecord) -> String {
    let mut line = format!("{}  {:<10}  {}", doc.file_id, doc.status.label(), doc.filename);
    if let Some(chunks) = doc.chunk_count {
        let _ = write!(line, "  chunks={chunks}");
    }
    if let Some(size) = doc.size_bytes {
        let _ = write!(line, "  size={}", format_file_size(size));
    }
    if let Some(at) = &doc.uploaded_at {
        let _ = write!(line, "  uploaded={}", format_timestamp(at));
    }
    line.push('\n');
    line
}

#[must_use]
pub fn documents_text(documents: &Snapshot<Vec<DocumentRecord>>) -> String {
    snapshot_text(documents, "documents", |docs| {
        if docs.is_empty() {
            return "No documents uploaded yet\n".to_owned();
        }
        docs.iter().map(document_line).collect()
    })
}

fn collection_line(col: &CollectionSummary) -> String {
    let count = col.document_count.map_or_else(|| "Error".to_owned(), |n| n.to_string());
    let mut line = format!("{}  {count} documents  id={}", col.name, col.id);
    if let Some(err) = &col.error {
        let _ = write!(line, "  error={err}");
    }
    line.push('\n');
    line
}

#[must_use]
pub fn collections_text(collections: &Snapshot<Vec<CollectionSummary>>) -> String {
    snapshot_text(collections, "collections", |cols| {
        if cols.is_empty() {
            return "No collections found\n".to_owned();
        }
        cols.iter().map(collection_line).collect()
    })
}

#[must_use]
pub fn collection_detail_text(detail: &Snapshot<CollectionDetail>) -> String {
    snapshot_text(detail, "collection details", |d| {
        let total = d.count.map_or_else(|| "Unknown".to_owned(), |n| n.to_string());
        let mut out = format!(
            "Collection: {}\nTotal Documents: {total}\nHas Embeddings: {}\n",
            d.name,
            if d.has_embeddings { "Yes" } else { "No" }
        );
        for entry in &d.entries {
            let _ = writeln!(out, "- {}: {}", entry.id, truncate_chars(&entry.content, PREVIEW_CHARS));
        }
        out
    })
}

#[must_use]
pub fn search_text(search: &Snapshot<SearchResults>) -> String {
    snapshot_text(search, "search results", |found| {
        if found.results.is_empty() {
            return format!("No results found for \"{}\"\n", found.query);
        }
        let mut out = format!(
            "Search Results for: \"{}\" ({} results found)\n",
            found.query,
            found.results.len()
        );
        for (i, hit) in found.results.iter().enumerate() {
            let chunk = hit.chunk_index.map_or_else(|| "N/A".to_owned(), |c| c.to_string());
            let _ = writeln!(
                out,
                "\n{}. [score {}] {} (chunk {chunk})\n   {}",
                i + 1,
                format_score(hit.score),
                hit.document_ref,
                truncate_chars(&hit.content, PREVIEW_CHARS)
            );
        }
        out
    })
}

/// One line per message; placeholders print as `Thinking...`.
#[must_use]
pub fn chat_text(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let who = match m.sender {
                Sender::User => "you",
                Sender::Bot => "bot",
            };
            let text = if m.is_placeholder() { "Thinking..." } else { m.text.as_str() };
            format!("{who}: {text}\n")
        })
        .collect()
}

#[must_use]
pub fn uploads_text(uploads: &UploadList) -> String {
    uploads
        .entries()
        .iter()
        .map(|e| match &e.outcome {
            UploadOutcome::Uploading => format!("{}: uploading {}%\n", e.filename, e.percent()),
            UploadOutcome::Uploaded { file_id } => format!("{}: uploaded as {file_id}\n", e.filename),
            UploadOutcome::Rejected(reason) => format!("{}: rejected: {reason}\n", e.filename),
            UploadOutcome::Failed(reason) => format!("{}: failed: {reason}\n", e.filename),
        })
        .collect()
}

#[must_use]
pub fn notifications_text(notifications: &Notifications) -> String {
    notifications
        .iter()
        .map(|n| match n.repeats {
            0 | 1 => format!("[{}] {}\n", n.level, n.message),
            k => format!("[{}] {} (x{k})\n", n.level, n.message),
        })
        .collect()
}

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;
