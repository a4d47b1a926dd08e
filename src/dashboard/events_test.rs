use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::dashboard::test_helpers::{FakeBackend, dashboard_with};

#[test]
fn standard_table_registers_every_action() {
    let table = EventTable::standard();
    let names: Vec<&str> = table.names().collect();
    assert_eq!(
        names,
        vec![
            "chat",
            "clear-all",
            "clear-chat",
            "delete-document",
            "refresh-collections",
            "refresh-documents",
            "refresh-health",
            "search",
            "upload",
            "view-collection",
        ]
    );
}

#[tokio::test]
async fn unknown_event_is_an_error() {
    let dash = dashboard_with(&FakeBackend::new());
    let err = EventTable::standard().dispatch(&dash, "reboot", "").await.unwrap_err();
    assert_eq!(err, EventError::UnknownEvent("reboot".into()));
    assert_eq!(err.to_string(), "unknown event: reboot");
}

#[tokio::test]
async fn custom_handler_receives_payload() {
    static HITS: AtomicUsize = AtomicUsize::new(0);
    let mut table = EventTable::new();
    table.register("ping", |_, payload| async move {
        HITS.fetch_add(payload.len(), Ordering::SeqCst);
    });

    let dash = dashboard_with(&FakeBackend::new());
    table.dispatch(&dash, "ping", "abc").await.unwrap();
    assert!(table.contains("ping"));
    assert_eq!(HITS.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn search_event_runs_a_search() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    EventTable::standard().dispatch(&dash, "search", "embeddings").await.unwrap();
    assert_eq!(fake.calls(), vec!["search:embeddings:10".to_owned()]);
}

#[tokio::test]
async fn chat_and_clear_chat_events() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    let table = EventTable::standard();

    table.dispatch(&dash, "chat", "hello").await.unwrap();
    dash.store().read(|s| assert_eq!(s.chat.messages().len(), 2));

    table.dispatch(&dash, "clear-chat", "").await.unwrap();
    dash.store().read(|s| assert!(s.chat.is_empty()));
}

#[tokio::test]
async fn controller_failures_do_not_fail_dispatch() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    let table = EventTable::standard();

    table.dispatch(&dash, "search", "   ").await.unwrap();
    table.dispatch(&dash, "delete-document", "").await.unwrap();
    assert!(fake.calls().is_empty());
    dash.store().read(|s| assert_eq!(s.notifications.len(), 2));
}

#[tokio::test]
async fn upload_event_splits_paths_by_line() {
    let fake = FakeBackend::new();
    let dash = dashboard_with(&fake);
    EventTable::standard()
        .dispatch(&dash, "upload", "a.txt\n\n  b.docx  \n")
        .await
        .unwrap();

    dash.store().read(|s| {
        let names: Vec<&str> = s.uploads.entries().iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.docx"]);
    });
    assert_eq!(fake.count("upload"), 0);
    assert_eq!(fake.count("documents"), 1);
}

#[test]
fn parse_paths_skips_blank_lines() {
    assert_eq!(parse_paths(" x.pdf \r\n\n y.pdf"), vec![PathBuf::from("x.pdf"), PathBuf::from("y.pdf")]);
}
