//! Upload controller: sequential, per-file isolated, one refresh at the end.
//!
//! DESIGN
//! ======
//! Files go one at a time. Each is validated client-side first (a non-PDF
//! never reaches the network), then streamed with a progress callback that
//! writes straight into the store. A failure is recorded against its own
//! file and the batch moves on. After the last file the document list and
//! the collections are refreshed exactly once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::Dashboard;
use crate::net::api::{ProgressFn, UploadFile};
use crate::net::error::ApiError;
use crate::net::types::UploadAck;
use crate::state::notifications::Level;
use crate::state::uploads::UploadOutcome;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Reject anything that is not a PDF by extension and content type.
///
/// # Errors
///
/// Returns `ApiError::Validation` naming the file.
pub fn validate_pdf(file: &UploadFile) -> Result<(), ApiError> {
    let is_pdf_name = Path::new(&file.filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf_name || !file.content_type.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
        return Err(ApiError::Validation(format!("{}: only PDF files are accepted", file.filename)));
    }
    Ok(())
}

/// Result for one file of a batch.
#[derive(Clone, Debug, PartialEq)]
pub enum FileOutcome {
    Uploaded(UploadAck),
    /// Refused before any network call.
    Rejected(ApiError),
    Failed(ApiError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileReport {
    pub filename: String,
    pub outcome: FileOutcome,
}

/// Per-file outcomes in submission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadReport {
    pub files: Vec<FileReport>,
}

impl UploadReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Uploaded(_)))
    }

    #[must_use]
    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Rejected(_)))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.files.len()
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// Where a batch entry's bytes come from.
enum Source {
    Loaded(UploadFile),
    Path(PathBuf),
}

impl Source {
    fn filename(&self) -> String {
        match self {
            Self::Loaded(file) => file.filename.clone(),
            Self::Path(path) => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        }
    }
}

impl Dashboard {
    /// Upload in-memory files.
    pub async fn upload_files(&self, files: Vec<UploadFile>) -> UploadReport {
        self.upload_batch(files.into_iter().map(Source::Loaded).collect()).await
    }

    /// Upload files from disk. Names are validated before anything is read.
    pub async fn upload_paths(&self, paths: &[PathBuf]) -> UploadReport {
        self.upload_batch(paths.iter().cloned().map(Source::Path).collect()).await
    }

    async fn upload_batch(&self, sources: Vec<Source>) -> UploadReport {
        let mut report = UploadReport::default();
        if sources.is_empty() {
            return report;
        }

        for source in sources {
            let filename = source.filename();
            let outcome = self.upload_one(source, &filename).await;
            report.files.push(FileReport { filename, outcome });
        }

        info!(
            succeeded = report.succeeded(),
            rejected = report.rejected(),
            failed = report.failed(),
            "upload batch finished"
        );
        self.refresh_after_mutation().await;
        report
    }

    async fn upload_one(&self, source: Source, filename: &str) -> FileOutcome {
        let entry = self.store().update(|s| s.uploads.start(filename, 0));

        let file = match source {
            Source::Loaded(file) => file,
            Source::Path(path) => {
                let named = UploadFile::new(filename, Vec::new());
                if let Err(e) = validate_pdf(&named) {
                    return self.reject_upload(entry, filename, e);
                }
                match tokio::fs::read(&path).await {
                    Ok(data) => UploadFile { data, ..named },
                    Err(e) => {
                        let err = ApiError::Validation(format!("{filename}: cannot read file: {e}"));
                        return self.reject_upload(entry, filename, err);
                    }
                }
            }
        };

        if let Err(e) = validate_pdf(&file) {
            return self.reject_upload(entry, filename, e);
        }

        let total = file.len();
        self.store().update(|s| s.uploads.progress(entry, 0, total));
        let progress: ProgressFn = {
            let store = self.store().clone();
            Arc::new(move |sent, total| store.update(|s| s.uploads.progress(entry, sent, total)))
        };

        match self.backend.upload(file, progress).await {
            Ok(ack) => {
                info!(filename, file_id = %ack.file_id, "upload accepted");
                let file_id = ack.file_id.clone();
                self.store().update(|s| {
                    s.uploads.finish(entry, UploadOutcome::Uploaded { file_id });
                    s.notifications.push(Level::Success, format!("Uploaded {filename}"));
                });
                FileOutcome::Uploaded(ack)
            }
            Err(e) => {
                warn!(filename, error = %e, "upload failed");
                let reason = e.to_string();
                self.store().update(|s| {
                    s.uploads.finish(entry, UploadOutcome::Failed(reason.clone()));
                    s.notifications.push(Level::Error, format!("Upload failed for {filename}: {reason}"));
                });
                FileOutcome::Failed(e)
            }
        }
    }

    fn reject_upload(&self, entry: Uuid, filename: &str, err: ApiError) -> FileOutcome {
        warn!(filename, error = %err, "upload rejected");
        let reason = err.to_string();
        self.store().update(|s| {
            s.uploads.finish(entry, UploadOutcome::Rejected(reason.clone()));
            s.notifications.push(Level::Warning, reason);
        });
        FileOutcome::Rejected(err)
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod upload_test;
