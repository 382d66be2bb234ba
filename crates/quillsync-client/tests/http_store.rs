//! Integration tests against a throwaway in-process backend.
//!
//! The backend double implements the same three-operation surface the real
//! document store exposes: POST creates and returns a plain-text id, GET
//! serves the stored JSON, PATCH applies a unified-diff patch to the stored
//! content.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use tokio::sync::mpsc;

use quillsync_client::HttpDocumentStore;
use quillsync_core::{DiffEngine, DocumentStore, Patch, SyncError, SyncSession, UnifiedDiff};

type Docs = Arc<Mutex<HashMap<String, String>>>;

async fn create_doc(State(docs): State<Docs>, body: String) -> String {
    let mut docs = docs.lock().unwrap();
    let id = (docs.len() + 1).to_string();
    docs.insert(id.clone(), body);
    id
}

async fn fetch_doc(State(docs): State<Docs>, Path(id): Path<String>) -> Result<String, StatusCode> {
    docs.lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

async fn patch_doc(State(docs): State<Docs>, Path(id): Path<String>, body: String) -> StatusCode {
    let mut docs = docs.lock().unwrap();
    let Some(current) = docs.get(&id) else {
        return StatusCode::NOT_FOUND;
    };
    match UnifiedDiff.apply(current, &Patch::from_text(body)) {
        Ok(updated) => {
            docs.insert(id, updated);
            StatusCode::OK
        }
        Err(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn spawn_backend() -> (String, Docs) {
    let docs = Docs::default();
    let app = Router::new()
        .route("/document", post(create_doc))
        .route("/document/{id}", get(fetch_doc).patch(patch_doc))
        .with_state(docs.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), docs)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_then_fetch_roundtrip() {
    let (base_url, _docs) = spawn_backend().await;
    let store = HttpDocumentStore::new(&base_url);

    let id = store.create("{\"type\":\"doc\"}").await.unwrap();
    assert_eq!(id.as_str(), "1");

    let content = store.fetch(&id).await.unwrap();
    assert_eq!(content, "{\"type\":\"doc\"}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_patch_updates_remote_content() {
    let (base_url, _docs) = spawn_backend().await;
    let store = HttpDocumentStore::new(&base_url);

    let old = "{\"type\":\"doc\",\"content\":[]}";
    let new = "{\"type\":\"doc\",\"content\":[{\"type\":\"paragraph\"}]}";
    let id = store.create(old).await.unwrap();

    let patch = UnifiedDiff.diff(old, new).unwrap();
    store.apply_patch(&id, &patch).await.unwrap();

    assert_eq!(store.fetch(&id).await.unwrap(), new);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_unknown_document_is_backend_error() {
    let (base_url, _docs) = spawn_backend().await;
    let store = HttpDocumentStore::new(&base_url);

    let err = store.fetch(&"999".into()).await.unwrap_err();
    match err {
        SyncError::Backend { status, .. } => assert_eq!(status, 404),
        other => panic!("expected Backend error, got {other}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_patch_against_stale_base_is_rejected() {
    let (base_url, docs) = spawn_backend().await;
    let store = HttpDocumentStore::new(&base_url);

    let id = store.create("a\n").await.unwrap();
    // Remote content moves out from under the patch.
    docs.lock()
        .unwrap()
        .insert(id.as_str().to_owned(), "completely different\n".to_owned());

    let patch = UnifiedDiff.diff("a\n", "b\n").unwrap();
    let err = store.apply_patch(&id, &patch).await.unwrap_err();
    assert!(matches!(err, SyncError::Backend { status: 422, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_json_fetch_body_is_malformed_response() {
    let (base_url, _docs) = spawn_backend().await;
    let store = HttpDocumentStore::new(&base_url);

    // The double stores bodies verbatim, so a non-JSON document comes back
    // as-is and must fail decoding rather than surface as a Backend error.
    let id = store.create("plain text, not a document").await.unwrap();

    let err = store.fetch(&id).await.unwrap_err();
    assert!(matches!(err, SyncError::MalformedResponse(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_backend_is_transport_error() {
    // Bind then drop to get a port with nothing listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpDocumentStore::new(format!("http://{addr}"));

    let err = store.fetch(&"1".into()).await.unwrap_err();
    assert!(matches!(err, SyncError::Transport(_)));

    let err = store.create("{\"type\":\"doc\"}").await.unwrap_err();
    assert!(matches!(err, SyncError::Transport(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_session_end_to_end_over_http() {
    let (base_url, _docs) = spawn_backend().await;
    let store = HttpDocumentStore::new(&base_url);
    let mut session = SyncSession::new(store.clone()).with_window(Duration::from_millis(50));

    session.create("{\"type\":\"doc\",\"rev\":1}").await.unwrap();

    let (tx, rx) = mpsc::channel(8);
    tx.send("{\"type\":\"doc\",\"rev\":2}".to_owned()).await.unwrap();
    tx.send("{\"type\":\"doc\",\"rev\":3}".to_owned()).await.unwrap();
    drop(tx);
    session.run(rx).await;

    let id = session.tracker().document_id().unwrap().clone();
    assert_eq!(store.fetch(&id).await.unwrap(), "{\"type\":\"doc\",\"rev\":3}");
    assert_eq!(
        session.tracker().previous_snapshot().unwrap(),
        "{\"type\":\"doc\",\"rev\":3}"
    );
}
