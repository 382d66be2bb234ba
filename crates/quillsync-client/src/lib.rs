//! HTTP client for the quillsync document backend.
//!
//! Consumes the backend's three-operation surface:
//!
//! | operation   | method | path             | body          | response          |
//! |-------------|--------|------------------|---------------|-------------------|
//! | create      | POST   | `/document`      | document JSON | id as plain text  |
//! | fetch       | GET    | `/document/{id}` | (none)        | document JSON     |
//! | apply_patch | PATCH  | `/document/{id}` | patch text    | status only       |
//!
//! Non-success statuses are logged with their code and reason and mapped to
//! [`SyncError::Backend`]; the caller skips its state update. No timeouts
//! are configured beyond reqwest's defaults.

mod config;

pub use config::{Config, DEFAULT_BASE_URL, FileStore, Loader, Saver};

use quillsync_core::{DocumentId, DocumentStore, Patch, SyncError};

/// Document store reachable over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDocumentStore {
    /// New store against the given base URL (trailing slashes ignored).
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.as_ref().trim_end_matches('/').to_owned(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/document", self.base_url)
    }

    fn document_url(&self, id: &DocumentId) -> String {
        format!("{}/document/{}", self.base_url, id)
    }
}

fn transport(e: reqwest::Error) -> SyncError {
    SyncError::Transport(e.to_string())
}

/// Map a non-success response to `SyncError::Backend`, logging code + reason.
fn require_success(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_owned();
    tracing::warn!(status = status.as_u16(), %message, "backend request failed");
    Err(SyncError::Backend {
        status: status.as_u16(),
        message,
    })
}

impl DocumentStore for HttpDocumentStore {
    async fn create(&self, content: &str) -> Result<DocumentId, SyncError> {
        let response = self
            .client
            .post(self.collection_url())
            .body(content.to_owned())
            .send()
            .await
            .map_err(transport)?;
        let id = require_success(response)?.text().await.map_err(transport)?;
        Ok(DocumentId::from(id))
    }

    async fn fetch(&self, id: &DocumentId) -> Result<String, SyncError> {
        let response = self
            .client
            .get(self.document_url(id))
            .send()
            .await
            .map_err(transport)?;
        // The backend serves JSON; decode to validate, then hand the editor
        // shell the serialized form (key order preserved).
        let content: serde_json::Value = require_success(response)?
            .json()
            .await
            .map_err(|e| SyncError::MalformedResponse(e.to_string()))?;
        serde_json::to_string(&content).map_err(|e| SyncError::MalformedResponse(e.to_string()))
    }

    async fn apply_patch(&self, id: &DocumentId, patch: &Patch) -> Result<(), SyncError> {
        let response = self
            .client
            .patch(self.document_url(id))
            .body(patch.as_str().to_owned())
            .send()
            .await
            .map_err(transport)?;
        require_success(response)?;
        Ok(())
    }
}
