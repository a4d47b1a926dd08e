//! View state store: the single source of truth for rendering.
//!
//! SYSTEM CONTEXT
//! ==============
//! Controllers in `dashboard` are the only writers. Renderers read a
//! consistent `ViewState` through [`Store::read`] or a cloned snapshot.
//!
//! DESIGN
//! ======
//! One `std::sync::RwLock` guards the whole `ViewState`. Writers hold it for
//! a short synchronous closure and never across an `.await`, which also lets
//! synchronous upload progress callbacks write into it. Each applied change
//! bumps a revision published on a `watch` channel so a renderer can wait
//! for "something changed" without polling.

pub mod chat;
pub mod notifications;
pub mod snapshot;
pub mod uploads;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;

use self::chat::ChatLog;
use self::notifications::Notifications;
use self::snapshot::{Applied, Snapshot};
use self::uploads::UploadList;
use crate::net::error::ApiError;
use crate::net::types::{CollectionDetail, CollectionSummary, DocumentRecord, HealthReport, SearchResult};

/// Sequenced resources fetched from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Health,
    Documents,
    Collections,
    CollectionDetail,
    Search,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Health => "health",
            Self::Documents => "documents",
            Self::Collections => "collections",
            Self::CollectionDetail => "collection detail",
            Self::Search => "search",
        })
    }
}

/// Search hits together with the query that produced them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchResult>,
}

/// Everything the renderer needs.
#[derive(Clone, Debug, Default)]
pub struct ViewState {
    pub health: Snapshot<HealthReport>,
    pub documents: Snapshot<Vec<DocumentRecord>>,
    pub collections: Snapshot<Vec<CollectionSummary>>,
    pub collection_detail: Snapshot<CollectionDetail>,
    pub search: Snapshot<SearchResults>,
    pub chat: ChatLog,
    pub uploads: UploadList,
    pub notifications: Notifications,
}

impl ViewState {
    fn begin(&mut self, resource: Resource, seq: u64) {
        match resource {
            Resource::Health => self.health.begin(seq),
            Resource::Documents => self.documents.begin(seq),
            Resource::Collections => self.collections.begin(seq),
            Resource::CollectionDetail => self.collection_detail.begin(seq),
            Resource::Search => self.search.begin(seq),
        }
    }
}

/// Shared handle to the view state. Cheap to clone.
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<ViewState>>,
    revision: Arc<watch::Sender<u64>>,
    next_seq: Arc<AtomicU64>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("revision", &self.revision()).finish_non_exhaustive()
    }
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(ViewState::default())),
            revision: Arc::new(revision),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Mint the next sequence number and mark `resource` as loading.
    pub fn begin(&self, resource: Resource) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.update(|state| state.begin(resource, seq));
        seq
    }

    /// Apply the result of fetch `seq` to the snapshot chosen by `select`.
    ///
    /// Only bumps the revision when something changed.
    pub fn resolve<T>(
        &self,
        select: impl FnOnce(&mut ViewState) -> &mut Snapshot<T>,
        seq: u64,
        result: Result<T, ApiError>,
    ) -> Applied {
        let applied = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            select(&mut *state).resolve(seq, result)
        };
        if applied != Applied::Stale {
            self.bump();
        }
        applied
    }

    /// Mutate the state under the write lock and publish a new revision.
    pub fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let out = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut *state)
        };
        self.bump();
        out
    }

    pub fn read<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&*state)
    }

    /// Owned copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        self.read(Clone::clone)
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that wakes on every published revision.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}
