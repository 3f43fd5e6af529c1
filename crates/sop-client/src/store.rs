//! The process-wide document cache.
//!
//! One owned store instance is constructed at startup and handed to whoever
//! needs it; there is no ambient singleton. Every mutation is
//! write-then-refetch: the gateway call goes out first, and only on success
//! is the whole collection re-read. The cache is only ever replaced
//! wholesale, so readers never observe a partially applied mutation. There
//! is no optimistic merge; the cache reflects server-confirmed state only.
//!
//! Overlapping mutations are not serialized. Two rapid calls can trigger
//! overlapping refreshes and the last one to finish wins - accepted under
//! the single-user assumption.

use crate::error::ClientError;
use crate::gateway::DocumentGateway;
use sop_core::edit::EditSession;
use sop_core::model::Document;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

pub struct DocumentStore {
    gateway: Arc<dyn DocumentGateway>,
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    documents: Vec<Document>,
    loading: bool,
    last_error: Option<String>,
}

/// A save that didn't stick. The session comes back to the caller so the
/// edit can continue (or be retried) with nothing lost.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SaveFailed {
    pub session: EditSession,
    pub error: ClientError,
}

impl DocumentStore {
    pub fn new(gateway: Arc<dyn DocumentGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Snapshot of the cached collection.
    pub async fn documents(&self) -> Vec<Document> {
        self.state.read().await.documents.clone()
    }

    /// Cached document by id.
    pub async fn get(&self, id: &str) -> Option<Document> {
        self.state
            .read()
            .await
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// Whether a refresh is currently outstanding.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// The most recent recorded failure, if any. Cleared by the next refresh.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Re-read the authoritative collection, replacing the cache wholesale.
    ///
    /// The loading flag clears on both paths; a failure records the error
    /// and leaves the previous cache contents in place.
    pub async fn refresh(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.last_error = None;
        }

        let outcome = self.gateway.list().await;

        let mut state = self.state.write().await;
        match outcome {
            Ok(documents) => {
                tracing::debug!(count = documents.len(), "collection refreshed");
                state.documents = documents;
            }
            Err(err) => {
                tracing::warn!(%err, "refresh failed");
                state.last_error = Some(err.to_string());
            }
        }
        state.loading = false;
    }

    /// Create a document, then refetch.
    ///
    /// Unlike the other mutations this reports its failure directly, so
    /// validation messages can be shown inline next to the input that
    /// caused them.
    pub async fn create(&self, doc: &Document) -> Result<(), ClientError> {
        self.gateway.create(doc).await?;
        self.refresh().await;
        Ok(())
    }

    /// Overwrite a document wholesale, then refetch. Failure is recorded in
    /// the process-wide error field.
    pub async fn update(&self, id: &str, doc: &Document) {
        match self.gateway.update(id, doc).await {
            Ok(_) => self.refresh().await,
            Err(err) => self.record_error(err).await,
        }
    }

    /// Delete a document (cascading remotely), then refetch.
    pub async fn delete(&self, id: &str) {
        match self.gateway.delete(id).await {
            Ok(()) => self.refresh().await,
            Err(err) => self.record_error(err).await,
        }
    }

    /// Replace the entire remote collection, then refetch.
    pub async fn import(&self, docs: &[Document]) {
        match self.gateway.import(docs).await {
            Ok(()) => self.refresh().await,
            Err(err) => self.record_error(err).await,
        }
    }

    /// Populate the remote collection with sample data, then refetch.
    pub async fn seed(&self) {
        match self.gateway.seed().await {
            Ok(()) => self.refresh().await,
            Err(err) => self.record_error(err).await,
        }
    }

    /// Start an edit session on a deep copy of the cached document.
    pub async fn begin_edit(&self, id: &str) -> Result<EditSession, ClientError> {
        self.get(id)
            .await
            .map(EditSession::begin)
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    /// Commit an edit session: the entire working copy overwrites the
    /// remote document, no diffing. On failure the session is handed back
    /// still editable and the error is recorded.
    pub async fn save(&self, session: EditSession) -> Result<(), SaveFailed> {
        let document = session.document().clone();
        match self.gateway.update(&document.id, &document).await {
            Ok(_) => {
                self.refresh().await;
                Ok(())
            }
            Err(error) => {
                self.record_error(error.clone()).await;
                Err(SaveFailed { session, error })
            }
        }
    }

    async fn record_error(&self, err: ClientError) {
        tracing::warn!(%err, "mutation failed; cache left unchanged");
        self.state.write().await.last_error = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InMemoryGateway;
    use sop_core::edit::BlockPath;

    fn store_with(documents: Vec<Document>) -> (Arc<InMemoryGateway>, DocumentStore) {
        let gateway = Arc::new(InMemoryGateway::with_documents(documents));
        let store = DocumentStore::new(gateway.clone());
        (gateway, store)
    }

    #[tokio::test]
    async fn refresh_is_idempotent_against_a_stable_backend() {
        let (_, store) = store_with(vec![Document::new("sop-1", "First")]);
        store.refresh().await;
        let first = store.documents().await;
        store.refresh().await;
        assert_eq!(store.documents().await, first);
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn refresh_failure_records_error_and_keeps_cache() {
        let (gateway, store) = store_with(vec![Document::new("sop-1", "First")]);
        store.refresh().await;

        gateway.fail_next(ClientError::Fetch("Failed to fetch SOPs".into()));
        store.refresh().await;

        assert_eq!(store.documents().await.len(), 1);
        assert_eq!(store.last_error().await.as_deref(), Some("Failed to fetch SOPs"));
        assert!(!store.is_loading().await);

        // next successful refresh clears the error
        store.refresh().await;
        assert_eq!(store.last_error().await, None);
    }

    #[tokio::test]
    async fn create_refetches_on_success() {
        let (_, store) = store_with(Vec::new());
        store
            .create(&Document::new("sop-1700000000000", "Onboarding"))
            .await
            .unwrap();

        let docs = store.documents().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "Onboarding");
        assert!(docs[0].steps.is_empty());
    }

    #[tokio::test]
    async fn create_failure_reaches_the_caller_not_the_error_field() {
        let (_, store) = store_with(Vec::new());
        let err = store.create(&Document::new("sop-1", "")).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(store.documents().await.is_empty());
        assert_eq!(store.last_error().await, None);
    }

    #[tokio::test]
    async fn update_failure_is_recorded_process_wide() {
        let (_, store) = store_with(vec![Document::new("sop-1", "First")]);
        store.refresh().await;

        store
            .update("sop-ghost", &Document::new("sop-ghost", "Ghost"))
            .await;

        assert!(store.last_error().await.is_some());
        assert_eq!(store.documents().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_and_refetches() {
        let (_, store) = store_with(vec![
            Document::new("sop-1", "First"),
            Document::new("sop-2", "Second"),
        ]);
        store.refresh().await;
        store.delete("sop-1").await;

        let docs = store.documents().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "sop-2");
    }

    #[tokio::test]
    async fn import_replaces_the_collection() {
        let (_, store) = store_with(vec![Document::new("sop-old", "Old")]);
        store.refresh().await;
        store.import(&[Document::new("sop-new", "New")]).await;

        let docs = store.documents().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "sop-new");
    }

    #[tokio::test]
    async fn seed_populates_sample_data() {
        let (_, store) = store_with(Vec::new());
        store.seed().await;
        assert!(!store.documents().await.is_empty());
    }

    #[tokio::test]
    async fn begin_edit_of_missing_id_is_not_found() {
        let (_, store) = store_with(Vec::new());
        store.refresh().await;
        assert!(matches!(
            store.begin_edit("sop-nope").await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_save_hands_the_session_back() {
        let (gateway, store) = store_with(vec![Document::new("sop-1", "First")]);
        store.refresh().await;

        let mut session = store.begin_edit("sop-1").await.unwrap();
        session.add_step();
        session.set_text(BlockPath::Step(0), "Only step").unwrap();

        gateway.fail_next(ClientError::Fetch("Failed to update SOP".into()));
        let failed = store.save(session).await.unwrap_err();

        // remote and cache untouched, session still carries the edit
        assert!(store.documents().await[0].steps.is_empty());
        assert!(store.last_error().await.is_some());
        assert_eq!(failed.session.document().steps.len(), 1);

        // retry succeeds
        store.save(failed.session).await.unwrap();
        assert_eq!(store.documents().await[0].steps.len(), 1);
    }
}
