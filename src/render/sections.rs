//! HTML fragments for each dashboard panel.
//!
//! Every user action is a plain `<form method="post">` targeting
//! `/events/{name}` with a single `value` field, so the page works without
//! scripts and the event table stays the only dispatch path.

use std::fmt::Write;

use super::{PREVIEW_CHARS, escape, format_clock, format_file_size, format_score, format_timestamp, truncate_chars};
use crate::net::types::{
    CollectionDetail, CollectionSummary, DocumentRecord, DocumentStatus, HealthReport, HealthStatus, OverallHealth,
};
use crate::state::SearchResults;
use crate::state::chat::{ChatLog, Sender};
use crate::state::notifications::Notifications;
use crate::state::snapshot::{Snapshot, SnapshotView};
use crate::state::uploads::{UploadList, UploadOutcome};

/// Sample documents shown per collection card.
const SAMPLE_DOCUMENTS_SHOWN: usize = 2;

// =============================================================================
// SHARED
// =============================================================================

fn event_form(event: &str, value: &str, label: &str, class: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/events/{event}\" class=\"inline\">\
         <input type=\"hidden\" name=\"value\" value=\"{}\">\
         <button type=\"submit\" class=\"{class}\">{}</button></form>",
        escape(value),
        escape(label),
    )
}

fn panel(id: &str, title: &str, actions: &str, body: &str) -> String {
    format!(
        "<section id=\"{id}\" class=\"panel\">\n<h2>{}</h2>\n{actions}{body}</section>\n",
        escape(title)
    )
}

/// Dispatch on the snapshot's view: loading, ready, stale-with-banner, failed.
fn snapshot_body<T>(snapshot: &Snapshot<T>, what: &str, body: impl FnOnce(&T) -> String) -> String {
    match snapshot.view() {
        SnapshotView::Loading => format!("<div class=\"loading\">Loading {}...</div>\n", escape(what)),
        SnapshotView::Ready(data) => body(data),
        SnapshotView::Stale(data, err) => format!(
            "<div class=\"alert alert-warning stale\">Showing stale {}: {}</div>\n{}",
            escape(what),
            escape(&err.to_string()),
            body(data)
        ),
        SnapshotView::Failed(err) => format!(
            "<div class=\"alert alert-danger\">Failed to load {}: {}</div>\n",
            escape(what),
            escape(&err.to_string())
        ),
    }
}

/// `message_html` is inserted as-is; escape any user text inside it first.
fn empty_state(message_html: &str, hint: &str) -> String {
    format!("<div class=\"empty\"><p>{message_html}</p><small>{hint}</small></div>\n")
}

// =============================================================================
// HEALTH
// =============================================================================

fn overall_color(overall: OverallHealth) -> &'static str {
    match overall {
        OverallHealth::Healthy => "success",
        OverallHealth::Partial => "warning",
        OverallHealth::Unhealthy => "danger",
        OverallHealth::Unknown => "secondary",
    }
}

fn service_color(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "success",
        HealthStatus::Unhealthy | HealthStatus::Error => "danger",
        HealthStatus::Unknown => "secondary",
    }
}

/// Page title plus the overall health badge.
#[must_use]
pub fn header(health: &Snapshot<HealthReport>) -> String {
    let badge = match health.data() {
        Some(report) if report.total() > 0 => format!(
            "<span id=\"system-status\" class=\"badge bg-{}\">{}/{} Services Healthy</span>",
            overall_color(report.overall()),
            report.healthy_count(),
            report.total()
        ),
        _ => {
            let color = if health.last_error().is_some() { "danger" } else { "secondary" };
            format!("<span id=\"system-status\" class=\"badge bg-{color}\">Status Unknown</span>")
        }
    };
    format!("<header>\n<h1>RAG Dashboard</h1>\n{badge}\n</header>\n")
}

#[must_use]
pub fn health_section(health: &Snapshot<HealthReport>) -> String {
    let body = snapshot_body(health, "system status", |report| {
        if report.total() == 0 {
            return empty_state("No services reported", "The backend returned an empty status report");
        }
        let mut out = String::from("<table class=\"services\">\n<tr><th>Service</th><th>Status</th><th>Response</th></tr>\n");
        for svc in report.services.values() {
            let response = svc
                .response_time_ms
                .map_or_else(String::new, |ms| format!("{ms} ms"));
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td><span class=\"badge bg-{}\">{}</span></td><td>{}</td></tr>",
                escape(&svc.name),
                service_color(svc.status),
                svc.status.label(),
                escape(&response)
            );
            if let Some(err) = &svc.error {
                let _ = writeln!(out, "<tr class=\"service-error\"><td colspan=\"3\">{}</td></tr>", escape(err));
            }
        }
        out.push_str("</table>\n");
        out
    });
    let actions = event_form("refresh-health", "", "Refresh", "btn-refresh");
    panel("health", "System Status", &actions, &body)
}

// =============================================================================
// DOCUMENTS
// =============================================================================

fn document_status_color(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Completed => "bg-success",
        DocumentStatus::Processing | DocumentStatus::Uploading => "bg-warning",
        DocumentStatus::Failed => "bg-danger",
        DocumentStatus::Unknown => "bg-secondary",
    }
}

fn document_card(doc: &DocumentRecord) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"card document-card\">\n<div class=\"card-header\"><h3>{}</h3>\
         <span class=\"badge {} status-badge\">{}</span>{}</div>\n<div class=\"card-body\">\n",
        escape(&doc.filename),
        document_status_color(doc.status),
        doc.status.label(),
        event_form("delete-document", &doc.file_id, "Delete", "btn-delete"),
    );
    let uploaded = doc
        .uploaded_at
        .as_deref()
        .map_or_else(|| "Unknown".to_owned(), format_timestamp);
    let _ = writeln!(out, "<div>File ID: <code>{}</code></div>", escape(&doc.file_id));
    let _ = writeln!(out, "<div>Upload Time: {}</div>", escape(&uploaded));
    if let Some(size) = doc.size_bytes {
        let _ = writeln!(out, "<div>Size: {}</div>", format_file_size(size));
    }
    if let Some(chunks) = doc.chunk_count.filter(|c| *c > 0) {
        let _ = writeln!(out, "<div>Chunks: <strong>{chunks}</strong></div>");
    }
    if let Some(took) = doc.processing_time.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "<div>Processing Time: <strong>{}</strong></div>", escape(took));
    }
    out.push_str("</div>\n</div>\n");
    out
}

#[must_use]
pub fn documents_section(documents: &Snapshot<Vec<DocumentRecord>>) -> String {
    let body = snapshot_body(documents, "documents", |docs| {
        if docs.is_empty() {
            return empty_state("No documents uploaded yet", "Upload a PDF file to get started");
        }
        docs.iter().map(document_card).collect()
    });
    let actions = format!(
        "{}{}",
        event_form("refresh-documents", "", "Refresh", "btn-refresh"),
        event_form("clear-all", "", "Clear All", "btn-danger"),
    );
    panel("documents", "Documents", &actions, &body)
}

// =============================================================================
// COLLECTIONS
// =============================================================================

fn collection_card(col: &CollectionSummary) -> String {
    let mut out = String::new();
    let count = col
        .document_count
        .map_or_else(|| "Error".to_owned(), |n| n.to_string());
    let _ = write!(
        out,
        "<div class=\"card collection-card\">\n<div class=\"card-header\"><h3>{}</h3>{}</div>\n\
         <div class=\"card-body\">\n<span class=\"stat-item\">{} documents</span> \
         <span class=\"stat-item\">ID: {}</span>\n",
        escape(&col.name),
        event_form("view-collection", &col.name, "View Details", "btn-view"),
        escape(&count),
        escape(&col.id),
    );
    if let Some(err) = &col.error {
        let _ = writeln!(out, "<div class=\"alert alert-warning\"><strong>Error:</strong> {}</div>", escape(err));
    }
    if !col.sample_documents.is_empty() {
        out.push_str("<div class=\"samples\"><small>Sample Documents:</small>\n");
        for sample in col.sample_documents.iter().take(SAMPLE_DOCUMENTS_SHOWN) {
            let _ = writeln!(out, "<div class=\"sample\">{}</div>", escape(&truncate_chars(sample, PREVIEW_CHARS)));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n</div>\n");
    out
}

#[must_use]
pub fn collections_section(collections: &Snapshot<Vec<CollectionSummary>>) -> String {
    let body = snapshot_body(collections, "collections", |cols| {
        if cols.is_empty() {
            return empty_state("No collections found", "Collections will appear after uploading documents");
        }
        cols.iter().map(collection_card).collect()
    });
    let actions = event_form("refresh-collections", "", "Refresh", "btn-refresh");
    panel("collections", "Collections", &actions, &body)
}

/// Empty until a collection has been opened.
#[must_use]
pub fn collection_detail_section(detail: &Snapshot<CollectionDetail>) -> String {
    if matches!(detail.view(), SnapshotView::Loading) && !detail.is_loading() {
        return String::new();
    }
    let title = detail
        .data()
        .map_or_else(|| "Collection".to_owned(), |d| format!("Collection: {}", d.name));
    let body = snapshot_body(detail, "collection details", |d| {
        let mut out = String::new();
        let total = d.count.map_or_else(|| "Unknown".to_owned(), |n| n.to_string());
        let _ = writeln!(
            out,
            "<div><span class=\"badge bg-info\">Total Documents: {}</span> \
             <span class=\"badge bg-secondary\">Has Embeddings: {}</span></div>",
            escape(&total),
            if d.has_embeddings { "Yes" } else { "No" }
        );
        out.push_str("<table class=\"entries\">\n<tr><th>ID</th><th>Content</th><th>Metadata</th></tr>\n");
        for entry in &d.entries {
            let metadata = serde_json::to_string_pretty(&entry.metadata).unwrap_or_default();
            let _ = writeln!(
                out,
                "<tr><td><code>{}</code></td><td class=\"chunk-text\">{}</td><td><pre>{}</pre></td></tr>",
                escape(&entry.id),
                escape(&truncate_chars(&entry.content, PREVIEW_CHARS)),
                escape(&metadata)
            );
        }
        out.push_str("</table>\n");
        out
    });
    panel("collection-detail", &title, "", &body)
}

// =============================================================================
// SEARCH
// =============================================================================

#[must_use]
pub fn search_section(search: &Snapshot<SearchResults>) -> String {
    let form = "<form method=\"post\" action=\"/events/search\">\
                <input type=\"text\" name=\"value\" placeholder=\"Search documents\">\
                <button type=\"submit\">Search</button></form>\n";

    let body = match search.view() {
        SnapshotView::Loading if search.is_loading() => "<div class=\"loading\">Searching...</div>\n".to_owned(),
        SnapshotView::Loading => String::new(),
        _ => snapshot_body(search, "search results", render_results),
    };
    panel("search", "Search", form, &body)
}

fn render_results(found: &SearchResults) -> String {
    if found.results.is_empty() {
        return empty_state(
            &format!("No results found for \"{}\"", escape(&found.query)),
            "Try different keywords or upload relevant documents",
        );
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<h3>Search Results for: \"{}\"</h3>\n<span class=\"badge bg-success\">{} results found</span>",
        escape(&found.query),
        found.results.len()
    );
    for (i, hit) in found.results.iter().enumerate() {
        let chunk = hit.chunk_index.map_or_else(|| "N/A".to_owned(), |c| c.to_string());
        let _ = writeln!(
            out,
            "<div class=\"card search-result\">\n<h4>Result {} <span class=\"badge bg-info\">Score: {}</span></h4>\n\
             <div class=\"chunk-text\">{}</div>\n<small><strong>Source:</strong> {} | <strong>Chunk:</strong> {}</small>\n</div>",
            i + 1,
            format_score(hit.score),
            escape(&hit.content),
            escape(&hit.document_ref),
            escape(&chunk)
        );
    }
    out
}

// =============================================================================
// CHAT
// =============================================================================

#[must_use]
pub fn chat_section(chat: &ChatLog) -> String {
    let mut body = String::from("<div id=\"chat-messages\">\n");
    for msg in chat.messages() {
        let sender = match msg.sender {
            Sender::User => "user",
            Sender::Bot => "bot",
        };
        let text = if msg.is_placeholder() { "Thinking...".to_owned() } else { escape(&msg.text) };
        let lang = msg
            .language
            .map_or_else(String::new, |l| format!(" <span class=\"lang\">{}</span>", l.code()));
        let _ = writeln!(
            body,
            "<div class=\"chat-message {sender}\">{text}<span class=\"time\">{}</span>{lang}</div>",
            format_clock(msg.timestamp)
        );
    }
    body.push_str("</div>\n");
    body.push_str(
        "<form method=\"post\" action=\"/events/chat\">\
         <input type=\"text\" name=\"value\" placeholder=\"Ask a question\">\
         <button type=\"submit\">Send</button></form>\n",
    );
    let actions = event_form("clear-chat", "", "Clear", "btn-clear");
    panel("chat", "Chat", &actions, &body)
}

// =============================================================================
// UPLOADS & NOTIFICATIONS
// =============================================================================

#[must_use]
pub fn upload_section(uploads: &UploadList) -> String {
    let mut body = String::from(
        "<form method=\"post\" action=\"/events/upload\">\
         <textarea name=\"value\" placeholder=\"PDF paths, one per line\"></textarea>\
         <button type=\"submit\">Upload</button></form>\n",
    );
    if !uploads.is_empty() {
        body.push_str("<ul class=\"uploads\">\n");
        for entry in uploads.entries() {
            let outcome = match &entry.outcome {
                UploadOutcome::Uploading => format!("{}%", entry.percent()),
                UploadOutcome::Uploaded { file_id } => format!("Uploaded ({file_id})"),
                UploadOutcome::Rejected(reason) => format!("Rejected: {reason}"),
                UploadOutcome::Failed(reason) => format!("Failed: {reason}"),
            };
            let _ = writeln!(body, "<li>{} <span>{}</span></li>", escape(&entry.filename), escape(&outcome));
        }
        body.push_str("</ul>\n");
    }
    panel("upload", "Upload Documents", "", &body)
}

#[must_use]
pub fn notifications_section(notifications: &Notifications) -> String {
    if notifications.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul id=\"notifications\">\n");
    for note in notifications.iter() {
        let repeats = if note.repeats > 1 { format!(" (x{})", note.repeats) } else { String::new() };
        let _ = writeln!(
            out,
            "<li class=\"notification notification-{}\">{}{repeats}</li>",
            note.level,
            escape(&note.message)
        );
    }
    out.push_str("</ul>\n");
    out
}

#[cfg(test)]
#[path = "sections_test.rs"]
mod sections_test;
