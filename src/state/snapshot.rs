//! Sequenced last-known-good snapshot for one polled resource.
//!
//! DESIGN
//! ======
//! Fetches are tagged with a store-wide sequence number when they start.
//! Completion is applied only if it is newer than what the snapshot already
//! reflects, so a slow early response can never overwrite a fast later one.
//! Failures never clear data: the previous snapshot stays visible beside
//! the error ("stale data").

use crate::net::error::ApiError;

/// Outcome of resolving a fetch against a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// Data replaced wholesale.
    Replaced,
    /// Data kept, error recorded.
    Errored,
    /// Response older than current state; discarded.
    Stale,
}

/// Render-facing view of a snapshot.
#[derive(Debug, PartialEq)]
pub enum SnapshotView<'a, T> {
    Loading,
    Ready(&'a T),
    Stale(&'a T, &'a ApiError),
    Failed(&'a ApiError),
}

#[derive(Clone, Debug)]
pub struct Snapshot<T> {
    data: Option<T>,
    data_seq: u64,
    error: Option<ApiError>,
    error_seq: u64,
    latest_seq: u64,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self { data: None, data_seq: 0, error: None, error_seq: 0, latest_seq: 0 }
    }
}

impl<T> Snapshot<T> {
    /// Record that a fetch tagged `seq` is in flight.
    pub fn begin(&mut self, seq: u64) {
        self.latest_seq = self.latest_seq.max(seq);
    }

    /// Apply the result of the fetch tagged `seq`.
    pub fn resolve(&mut self, seq: u64, result: Result<T, ApiError>) -> Applied {
        if seq <= self.data_seq {
            return Applied::Stale;
        }
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.data_seq = seq;
                if self.error_seq < seq {
                    self.error = None;
                }
                Applied::Replaced
            }
            Err(err) => {
                if seq < self.error_seq {
                    return Applied::Stale;
                }
                self.error = Some(err);
                self.error_seq = seq;
                Applied::Errored
            }
        }
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Error from the most recent failed fetch newer than the data.
    #[must_use]
    pub fn last_error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn data_seq(&self) -> u64 {
        self.data_seq
    }

    /// A fetch newer than anything resolved is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.latest_seq > self.data_seq.max(self.error_seq)
    }

    #[must_use]
    pub fn view(&self) -> SnapshotView<'_, T> {
        match (&self.data, &self.error) {
            (Some(data), Some(err)) => SnapshotView::Stale(data, err),
            (Some(data), None) => SnapshotView::Ready(data),
            (None, Some(err)) => SnapshotView::Failed(err),
            (None, None) => SnapshotView::Loading,
        }
    }

    /// Drop data and error (e.g. after the backend was cleared).
    pub fn reset(&mut self) {
        self.data = None;
        self.error = None;
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;
