//! Gateway trait over the REST backend.
//!
//! Implementations:
//! - `HttpGateway` (in `http`) - The real backend over reqwest
//! - `InMemoryGateway` - For testing
//!
//! One network call per operation; no retries, no batching, no caching.
//! Caching is the store's job.

use crate::error::ClientError;
use async_trait::async_trait;
use sop_core::model::{ContentBlock, Document, Question, Step, SubHead};
use std::sync::Mutex;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Remote CRUD surface for the SOP collection.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    /// Fetch the whole collection.
    async fn list(&self) -> Result<Vec<Document>>;

    /// Create a document. The backend validates presence of required fields
    /// and echoes the created document back.
    async fn create(&self, doc: &Document) -> Result<Document>;

    /// Overwrite the document with the given id wholesale.
    async fn update(&self, id: &str, doc: &Document) -> Result<Document>;

    /// Delete a document and everything it owns.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Replace the entire remote collection.
    async fn import(&self, docs: &[Document]) -> Result<()>;

    /// Populate the remote collection with sample data.
    async fn seed(&self) -> Result<()>;
}

/// In-memory gateway for tests: a fake backend with failure injection.
pub struct InMemoryGateway {
    state: Mutex<GatewayState>,
}

struct GatewayState {
    documents: Vec<Document>,
    fail_next: Option<ClientError>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            state: Mutex::new(GatewayState {
                documents,
                fail_next: None,
            }),
        }
    }

    /// Make the next operation (whatever it is) fail with `err`.
    pub fn fail_next(&self, err: ClientError) {
        self.lock().fail_next = Some(err);
    }

    /// Snapshot of the fake backend's collection.
    pub fn documents(&self) -> Vec<Document> {
        self.lock().documents.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GatewayState> {
        // Mutex poisoning only happens if a test panicked mid-operation
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn take_failure(&self) -> Result<()> {
        match self.lock().fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentGateway for InMemoryGateway {
    async fn list(&self) -> Result<Vec<Document>> {
        self.take_failure()?;
        Ok(self.documents())
    }

    async fn create(&self, doc: &Document) -> Result<Document> {
        self.take_failure()?;
        // The backend's presence check, mirrored
        if doc.name.trim().is_empty() {
            return Err(ClientError::Validation("Name is required".into()));
        }
        self.lock().documents.push(doc.clone());
        Ok(doc.clone())
    }

    async fn update(&self, id: &str, doc: &Document) -> Result<Document> {
        self.take_failure()?;
        let mut state = self.lock();
        match state.documents.iter_mut().find(|d| d.id == id) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(doc.clone())
            }
            None => Err(ClientError::Fetch("Failed to update SOP".into())),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.take_failure()?;
        let mut state = self.lock();
        let before = state.documents.len();
        state.documents.retain(|d| d.id != id);
        if state.documents.len() == before {
            return Err(ClientError::Fetch("Failed to delete SOP".into()));
        }
        Ok(())
    }

    async fn import(&self, docs: &[Document]) -> Result<()> {
        self.take_failure()?;
        self.lock().documents = docs.to_vec();
        Ok(())
    }

    async fn seed(&self) -> Result<()> {
        self.take_failure()?;
        self.lock().documents = sample_documents();
        Ok(())
    }
}

/// The sample collection a freshly seeded backend serves.
pub fn sample_documents() -> Vec<Document> {
    vec![Document {
        id: "sop-1".into(),
        name: "Employee Onboarding".into(),
        steps: vec![Step {
            id: "s1".into(),
            step_head: ContentBlock::titled("Before day one"),
            sub_heads: vec![SubHead {
                id: "sb1".into(),
                sub_head_name: ContentBlock::titled("Accounts"),
                questions: vec![Question {
                    id: "q1".into(),
                    content: ContentBlock::titled("Email account created?"),
                }],
            }],
        }],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_rejects_blank_names() {
        let gateway = InMemoryGateway::new();
        let doc = Document::new("sop-1", "   ");
        let err = gateway.create(&doc).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(gateway.documents().is_empty());
    }

    #[tokio::test]
    async fn update_of_unknown_id_fails() {
        let gateway = InMemoryGateway::new();
        let doc = Document::new("sop-missing", "Ghost");
        assert!(matches!(
            gateway.update("sop-missing", &doc).await,
            Err(ClientError::Fetch(_))
        ));
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let gateway = InMemoryGateway::new();
        gateway.fail_next(ClientError::Fetch("boom".into()));
        assert!(gateway.list().await.is_err());
        assert!(gateway.list().await.is_ok());
    }
}
