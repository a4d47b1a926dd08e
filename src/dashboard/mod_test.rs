use std::time::Duration;

use super::test_helpers::{FakeBackend, dashboard_with, doc};
use super::*;
use crate::net::error::ErrorKind;
use crate::net::types::SearchResult;
use crate::state::snapshot::SnapshotView;

fn network(msg: &str) -> ApiError {
    ApiError::Network(msg.to_owned())
}

// =============================================================
// Refresh
// =============================================================

#[tokio::test]
async fn refresh_documents_replaces_snapshot() {
    let fake = FakeBackend::new();
    fake.documents_reply(Duration::ZERO, Ok(vec![doc("a"), doc("b")]));
    let dash = dashboard_with(&fake);

    assert_eq!(dash.refresh_documents().await.unwrap(), Applied::Replaced);
    dash.store().read(|s| assert_eq!(s.documents.data().unwrap().len(), 2));
}

#[tokio::test]
async fn failed_refresh_keeps_snapshot_and_notifies() {
    let fake = FakeBackend::new();
    fake.documents_reply(Duration::ZERO, Ok(vec![doc("a")]));
    fake.documents_reply(Duration::ZERO, Err(network("refused")));
    let dash = dashboard_with(&fake);

    dash.refresh_documents().await.unwrap();
    let err = dash.refresh_documents().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);

    dash.store().read(|s| {
        assert_eq!(s.documents.data().unwrap()[0].file_id, "a");
        assert_eq!(s.documents.last_error(), Some(&network("refused")));
        let note = s.notifications.latest().unwrap();
        assert_eq!(note.level, Level::Warning);
        assert_eq!(note.message, "Could not refresh documents: network error: refused");
    });
}

#[tokio::test(start_paused = true)]
async fn slow_early_response_does_not_overwrite_fast_later_one() {
    let fake = FakeBackend::new();
    fake.documents_reply(Duration::from_secs(5), Ok(vec![doc("a")]));
    fake.documents_reply(Duration::from_secs(1), Ok(vec![doc("b")]));
    let dash = dashboard_with(&fake);

    let (first, second) = tokio::join!(dash.refresh_documents(), dash.refresh_documents());
    assert_eq!(first.unwrap(), Applied::Stale);
    assert_eq!(second.unwrap(), Applied::Replaced);
    dash.store().read(|s| assert_eq!(s.documents.data().unwrap()[0].file_id, "b"));
}

#[tokio::test(start_paused = true)]
async fn stale_failure_is_discarded_silently() {
    let fake = FakeBackend::new();
    fake.documents_reply(Duration::from_secs(5), Err(network("late")));
    fake.documents_reply(Duration::from_secs(1), Ok(vec![doc("b")]));
    let dash = dashboard_with(&fake);

    let (first, _) = tokio::join!(dash.refresh_documents(), dash.refresh_documents());
    assert!(first.is_err());
    dash.store().read(|s| {
        assert_eq!(s.documents.last_error(), None);
        assert!(s.notifications.is_empty());
    });
}

#[tokio::test]
async fn refresh_all_hits_every_resource() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    dash.refresh_all().await;
    assert_eq!(fake.count("health"), 1);
    assert_eq!(fake.count("documents"), 1);
    assert_eq!(fake.count("collections"), 1);
}

// =============================================================
// Search & collections
// =============================================================

#[tokio::test]
async fn blank_search_is_rejected_without_network() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);

    let err = dash.search("   ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(fake.count("search"), 0);
    dash.store().read(|s| assert_eq!(s.notifications.latest().unwrap().message, "Please enter a search query"));
}

#[tokio::test]
async fn search_records_query_with_results_and_uses_default_limit() {
    let fake = FakeBackend::new();
    fake.search_reply(
        Duration::ZERO,
        Ok(vec![SearchResult { content: "c".into(), score: Some(0.9), document_ref: "a.pdf".into(), chunk_index: None }]),
    );
    let dash = dashboard_with(&fake);

    dash.search("  vectors ").await.unwrap();
    assert_eq!(fake.calls(), vec!["search:vectors:10".to_owned()]);
    dash.store().read(|s| {
        let found = s.search.data().unwrap();
        assert_eq!(found.query, "vectors");
        assert_eq!(found.results.len(), 1);
    });
}

#[tokio::test]
async fn zero_match_search_is_ready_and_empty() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    dash.search("zebra").await.unwrap();
    dash.store().read(|s| {
        assert!(matches!(s.search.view(), SnapshotView::Ready(found) if found.results.is_empty()));
    });
}

#[tokio::test]
async fn view_collection_uses_collection_limit() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    dash.view_collection("documents").await.unwrap();
    assert_eq!(fake.calls(), vec!["collection:documents:20".to_owned()]);
    dash.store().read(|s| assert_eq!(s.collection_detail.data().unwrap().name, "documents"));
}

// =============================================================
// Mutations
// =============================================================

#[tokio::test]
async fn delete_refreshes_documents_and_collections_once() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);

    dash.delete_document("f1").await.unwrap();
    assert_eq!(fake.count("delete"), 1);
    assert_eq!(fake.count("documents"), 1);
    assert_eq!(fake.count("collections"), 1);
    dash.store().read(|s| assert_eq!(s.notifications.latest().unwrap().level, Level::Success));
}

#[tokio::test]
async fn failed_delete_notifies_error_and_still_refreshes() {
    let fake = FakeBackend::new();
    fake.delete.push(Duration::ZERO, Err(ApiError::Http { status: 404, detail: Some("Document not found".into()) }));
    let dash = dashboard_with(&fake);

    let err = dash.delete_document("nope").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(fake.count("documents"), 1);
    dash.store().read(|s| {
        let note = s.notifications.latest().unwrap();
        assert_eq!(note.level, Level::Error);
        assert!(note.message.contains("Document not found"));
    });
}

#[tokio::test]
async fn clear_all_resets_detail_and_refreshes() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    dash.view_collection("documents").await.unwrap();

    dash.clear_all().await.unwrap();
    assert_eq!(fake.count("clear"), 1);
    assert_eq!(fake.count("documents"), 1);
    dash.store().read(|s| assert!(s.collection_detail.data().is_none()));
}

// =============================================================
// Polling
// =============================================================

#[tokio::test(start_paused = true)]
async fn polling_refreshes_on_each_interval() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    let mut scheduler = Scheduler::new();
    let intervals = PollIntervals {
        health: Duration::from_secs(10),
        documents: Duration::from_secs(60),
        collections: Duration::from_secs(60),
    };

    let handles = dash.start_polling(&mut scheduler, &intervals);
    assert_eq!(handles.len(), 3);

    tokio::time::sleep(Duration::from_secs(25)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(fake.count("health"), 3);
    assert_eq!(fake.count("documents"), 1);
    assert_eq!(fake.count("collections"), 1);

    scheduler.cancel(&handles[0]);
    tokio::time::sleep(Duration::from_secs(30)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(fake.count("health"), 3);
}
