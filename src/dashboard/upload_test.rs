use std::io::Write as _;

use super::*;
use crate::dashboard::test_helpers::{FakeBackend, dashboard_with};
use crate::net::error::ErrorKind;

fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, b"%PDF-1.4 test".to_vec())
}

// =============================================================
// validate_pdf
// =============================================================

#[test]
fn pdf_extension_is_case_insensitive() {
    assert!(validate_pdf(&pdf("report.PDF")).is_ok());
}

#[test]
fn non_pdf_is_rejected_with_validation_error() {
    let err = validate_pdf(&UploadFile::new("notes.txt", b"hi".to_vec())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "notes.txt: only PDF files are accepted");
}

#[test]
fn pdf_name_with_wrong_content_type_is_rejected() {
    let mut file = pdf("a.pdf");
    file.content_type = "text/html".into();
    assert!(validate_pdf(&file).is_err());
}

// =============================================================
// Batches
// =============================================================

#[tokio::test]
async fn mixed_batch_isolates_rejection_and_refreshes_once() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);

    let files = vec![pdf("good.pdf"), UploadFile::new("bad.txt", b"x".to_vec()), pdf("good2.pdf")];
    let report = dash.upload_files(files).await;

    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.rejected(), 1);
    assert!(matches!(&report.files[1].outcome, FileOutcome::Rejected(e) if e.kind() == ErrorKind::Validation));

    assert_eq!(
        fake.calls(),
        vec!["upload:good.pdf", "upload:good2.pdf", "documents", "collections"]
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn backend_failure_does_not_abort_the_rest() {
    let fake = FakeBackend::new();
    fake.upload_reply(Err(ApiError::Http { status: 500, detail: Some("processor down".into()) }));
    let dash = dashboard_with(&fake);

    let report = dash.upload_files(vec![pdf("a.pdf"), pdf("b.pdf")]).await;
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    assert!(!report.all_succeeded());
    assert_eq!(fake.count("documents"), 1);

    dash.store().read(|s| {
        let entries = s.uploads.entries();
        assert_eq!(entries[0].outcome, UploadOutcome::Failed("server returned 500: processor down".into()));
        assert_eq!(entries[1].outcome, UploadOutcome::Uploaded { file_id: "id-b.pdf".into() });
        assert_eq!(entries[1].percent(), 100);
    });
}

#[tokio::test]
async fn empty_batch_does_nothing() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    let report = dash.upload_files(Vec::new()).await;
    assert!(report.files.is_empty());
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn paths_are_read_after_name_validation() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("paper.pdf");
    std::fs::File::create(&good).unwrap().write_all(b"%PDF-1.7").unwrap();
    let bad = dir.path().join("image.png");
    let missing = dir.path().join("missing.pdf");

    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    let report = dash.upload_paths(&[good, bad, missing]).await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.rejected(), 2);
    assert_eq!(report.files[0].filename, "paper.pdf");
    assert!(matches!(&report.files[2].outcome, FileOutcome::Rejected(e) if e.to_string().contains("cannot read file")));
    assert_eq!(fake.count("upload"), 1);
    assert_eq!(fake.count("documents"), 1);
}
