//! Per-file upload progress and outcomes.

use uuid::Uuid;

/// Finished entries kept for display.
pub const MAX_FINISHED_UPLOADS: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploading,
    Uploaded { file_id: String },
    /// Rejected client-side before any network call.
    Rejected(String),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadEntry {
    pub id: Uuid,
    pub filename: String,
    pub sent_bytes: u64,
    pub total_bytes: u64,
    pub outcome: UploadOutcome,
}

impl UploadEntry {
    /// Whole-number percentage sent; an empty file counts as complete.
    #[must_use]
    pub fn percent(&self) -> u64 {
        if self.total_bytes == 0 {
            return 100;
        }
        (self.sent_bytes.min(self.total_bytes) * 100) / self.total_bytes
    }
}

#[derive(Clone, Debug, Default)]
pub struct UploadList {
    entries: Vec<UploadEntry>,
}

impl UploadList {
    pub fn start(&mut self, filename: impl Into<String>, total_bytes: u64) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push(UploadEntry {
            id,
            filename: filename.into(),
            sent_bytes: 0,
            total_bytes,
            outcome: UploadOutcome::Uploading,
        });
        self.prune();
        id
    }

    pub fn progress(&mut self, id: Uuid, sent: u64, total: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.sent_bytes = sent;
            entry.total_bytes = total;
        }
    }

    pub fn finish(&mut self, id: Uuid, outcome: UploadOutcome) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            if matches!(outcome, UploadOutcome::Uploaded { .. }) {
                entry.sent_bytes = entry.total_bytes;
            }
            entry.outcome = outcome;
        }
        self.prune();
    }

    #[must_use]
    pub fn entries(&self) -> &[UploadEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the oldest finished entries beyond the display cap.
    fn prune(&mut self) {
        let finished = self
            .entries
            .iter()
            .filter(|e| e.outcome != UploadOutcome::Uploading)
            .count();
        let mut excess = finished.saturating_sub(MAX_FINISHED_UPLOADS);
        self.entries.retain(|e| {
            if excess > 0 && e.outcome != UploadOutcome::Uploading {
                excess -= 1;
                return false;
            }
            true
        });
    }
}
