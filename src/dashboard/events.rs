//! Named user events and the table that routes them to dashboard actions.
//!
//! DESIGN
//! ======
//! Every user-triggered action is a `(name, payload)` pair. The table is
//! built once at start-up and shared read-only; the HTTP layer and the tests
//! both go through `dispatch`, so no handler is reachable any other way.
//! Handlers swallow controller errors: by the time they return, the failure
//! is already on the relevant snapshot and in the notification list.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use super::Dashboard;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EventError {
    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

type Handler = Box<dyn Fn(Arc<Dashboard>, String) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
pub struct EventTable {
    handlers: BTreeMap<&'static str, Handler>,
}

impl EventTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous one.
    pub fn register<F, Fut>(&mut self, name: &'static str, handler: F)
    where
        F: Fn(Arc<Dashboard>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handlers
            .insert(name, Box::new(move |dash, payload| handler(dash, payload).boxed()));
    }

    /// The dashboard's full event set.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register("refresh-health", |dash, _| async move {
            let _ = dash.refresh_health().await;
        });
        table.register("refresh-documents", |dash, _| async move {
            let _ = dash.refresh_documents().await;
        });
        table.register("refresh-collections", |dash, _| async move {
            let _ = dash.refresh_collections().await;
        });
        table.register("search", |dash, query| async move {
            let _ = dash.search(&query).await;
        });
        table.register("chat", |dash, message| async move {
            dash.send_chat(&message).await;
        });
        table.register("clear-chat", |dash, _| async move {
            dash.clear_chat();
        });
        table.register("view-collection", |dash, name| async move {
            let _ = dash.view_collection(&name).await;
        });
        table.register("delete-document", |dash, file_id| async move {
            let _ = dash.delete_document(&file_id).await;
        });
        table.register("clear-all", |dash, _| async move {
            let _ = dash.clear_all().await;
        });
        table.register("upload", |dash, paths| async move {
            dash.upload_paths(&parse_paths(&paths)).await;
        });
        table
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Run the handler for `name` to completion.
    ///
    /// # Errors
    ///
    /// `UnknownEvent` when nothing is registered under `name`.
    pub async fn dispatch(&self, dashboard: &Arc<Dashboard>, name: &str, payload: &str) -> Result<(), EventError> {
        let Some(handler) = self.handlers.get(name) else {
            warn!(event = name, "unknown event");
            return Err(EventError::UnknownEvent(name.to_owned()));
        };
        debug!(event = name, "dispatching event");
        handler(Arc::clone(dashboard), payload.to_owned()).await;
        Ok(())
    }
}

/// One path per non-blank line.
fn parse_paths(payload: &str) -> Vec<PathBuf> {
    payload
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;
