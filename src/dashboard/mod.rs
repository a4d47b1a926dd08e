//! Dashboard controller: the only writer of the view state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Scheduler ticks, CLI commands and HTTP events all call methods on one
//! shared `Dashboard`. It owns the backend handle and the `Store`; renderers
//! only ever see what it has written.
//!
//! ERROR HANDLING
//! ==============
//! Every fetch failure is recorded on the resource's snapshot (the previous
//! data stays visible) and surfaced as a notification. Methods still return
//! the error so one-shot callers can set an exit status, but nothing here
//! treats a failure as fatal.

#[cfg(test)]
pub(crate) mod test_helpers;

pub mod chat;
pub mod events;
pub mod scheduler;
pub mod upload;

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use self::scheduler::{Scheduler, TaskHandle};
use crate::config::{PollIntervals, QueryLimits};
use crate::net::api::Backend;
use crate::net::error::ApiError;
use crate::net::types::SearchQuery;
use crate::state::notifications::Level;
use crate::state::snapshot::{Applied, Snapshot};
use crate::state::{Resource, SearchResults, Store, ViewState};

pub struct Dashboard {
    backend: Arc<dyn Backend>,
    store: Store,
    limits: QueryLimits,
}

impl Dashboard {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, limits: QueryLimits) -> Self {
        Self { backend, store: Store::new(), limits }
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    pub fn notify(&self, level: Level, message: impl Into<String>) {
        let message = message.into();
        self.store.update(|s| s.notifications.push(level, message));
    }

    /// Sequence a fetch for `resource` and apply its result.
    ///
    /// The sequence number is minted before the request is sent, so a
    /// response is only applied if nothing newer has already landed.
    async fn track<T, F>(
        &self,
        resource: Resource,
        select: fn(&mut ViewState) -> &mut Snapshot<T>,
        fetch: F,
    ) -> Result<Applied, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let seq = self.store.begin(resource);
        let result = fetch.await;
        let failure = result.as_ref().err().cloned();
        let applied = self.store.resolve(select, seq, result);

        let Some(err) = failure else {
            if applied == Applied::Stale {
                debug!(%resource, seq, "discarding stale response");
            }
            return Ok(applied);
        };

        if applied == Applied::Errored {
            warn!(%resource, seq, kind = %err.kind(), error = %err, "refresh failed");
            self.notify(Level::Warning, format!("Could not refresh {resource}: {err}"));
        } else {
            debug!(%resource, seq, error = %err, "discarding stale failure");
        }
        Err(err)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// # Errors
    ///
    /// Returns the fetch error after recording it on the health snapshot.
    pub async fn refresh_health(&self) -> Result<Applied, ApiError> {
        self.track(Resource::Health, |s| &mut s.health, self.backend.system_status())
            .await
    }

    /// # Errors
    ///
    /// Returns the fetch error after recording it on the documents snapshot.
    pub async fn refresh_documents(&self) -> Result<Applied, ApiError> {
        self.track(Resource::Documents, |s| &mut s.documents, self.backend.documents())
            .await
    }

    /// # Errors
    ///
    /// Returns the fetch error after recording it on the collections snapshot.
    pub async fn refresh_collections(&self) -> Result<Applied, ApiError> {
        self.track(Resource::Collections, |s| &mut s.collections, self.backend.collections())
            .await
    }

    /// Refresh health, documents and collections concurrently.
    pub async fn refresh_all(&self) {
        let _ = tokio::join!(self.refresh_health(), self.refresh_documents(), self.refresh_collections());
    }

    /// Load the detail view for one collection.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank name (no request is made), otherwise the
    /// fetch error.
    pub async fn view_collection(&self, name: &str) -> Result<Applied, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject("Please choose a collection"));
        }
        let limit = self.limits.collection;
        self.track(
            Resource::CollectionDetail,
            |s| &mut s.collection_detail,
            self.backend.collection_detail(name, limit),
        )
        .await
    }

    /// Search with the configured result limit.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Dashboard::search_with`].
    pub async fn search(&self, query: &str) -> Result<Applied, ApiError> {
        let query = SearchQuery { query: query.to_owned(), ..SearchQuery::default() };
        self.search_with(query).await
    }

    /// Search with explicit options; a zero limit means the configured one.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank query (no request is made), otherwise the
    /// fetch error.
    pub async fn search_with(&self, mut query: SearchQuery) -> Result<Applied, ApiError> {
        query.query = query.query.trim().to_owned();
        if query.query.is_empty() {
            return Err(self.reject("Please enter a search query"));
        }
        if query.limit == 0 {
            query.limit = self.limits.search;
        }

        let backend = Arc::clone(&self.backend);
        let fetch = async move {
            let results = backend.search(&query).await?;
            Ok::<_, ApiError>(SearchResults { query: query.query, results })
        };
        self.track(Resource::Search, |s| &mut s.search, fetch).await
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Delete one document, then refresh documents and collections.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank id, otherwise the backend's error.
    pub async fn delete_document(&self, file_id: &str) -> Result<(), ApiError> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Err(self.reject("No document selected"));
        }

        let result = self.backend.delete_document(file_id).await;
        match &result {
            Ok(()) => {
                info!(file_id, "document deleted");
                self.notify(Level::Success, "Document deleted successfully");
            }
            Err(e) => {
                warn!(file_id, error = %e, "document delete failed");
                self.notify(Level::Error, format!("Failed to delete document: {e}"));
            }
        }
        self.refresh_after_mutation().await;
        result
    }

    /// Remove every document from the backend, then refresh.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn clear_all(&self) -> Result<(), ApiError> {
        let result = self.backend.clear_all().await;
        match &result {
            Ok(()) => {
                info!("all documents cleared");
                self.store.update(|s| {
                    s.collection_detail.reset();
                    s.notifications.push(Level::Success, "All documents cleared successfully");
                });
            }
            Err(e) => {
                warn!(error = %e, "clear all failed");
                self.notify(Level::Error, format!("Failed to clear documents: {e}"));
            }
        }
        self.refresh_after_mutation().await;
        result
    }

    /// One documents refresh and one collections refresh, concurrently.
    pub(crate) async fn refresh_after_mutation(&self) {
        let _ = tokio::join!(self.refresh_documents(), self.refresh_collections());
    }

    fn reject(&self, message: &str) -> ApiError {
        self.notify(Level::Warning, message);
        ApiError::Validation(message.to_owned())
    }

    // =========================================================================
    // POLLING
    // =========================================================================

    /// Schedule the three background refreshes on `scheduler`.
    pub fn start_polling(self: &Arc<Self>, scheduler: &mut Scheduler, intervals: &PollIntervals) -> Vec<TaskHandle> {
        let health = {
            let dash = Arc::clone(self);
            scheduler.schedule("health", intervals.health, move || {
                let dash = Arc::clone(&dash);
                async move { dash.refresh_health().await.map(|_| ()) }
            })
        };
        let documents = {
            let dash = Arc::clone(self);
            scheduler.schedule("documents", intervals.documents, move || {
                let dash = Arc::clone(&dash);
                async move { dash.refresh_documents().await.map(|_| ()) }
            })
        };
        let collections = {
            let dash = Arc::clone(self);
            scheduler.schedule("collections", intervals.collections, move || {
                let dash = Arc::clone(&dash);
                async move { dash.refresh_collections().await.map(|_| ()) }
            })
        };
        vec![health, documents, collections]
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
