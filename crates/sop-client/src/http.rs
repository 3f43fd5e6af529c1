//! HTTP implementation of the document gateway.
//!
//! Endpoint map (bodies are the Document JSON shape):
//! - `GET    /sops`         list
//! - `POST   /sops`         create (error body `{ "error": ... }` surfaces as Validation)
//! - `PUT    /sops/{id}`    update
//! - `DELETE /sops/{id}`    delete
//! - `POST   /sops/import`  replace entire collection
//! - `POST   /seed`         populate sample data

use crate::error::ClientError;
use crate::gateway::{DocumentGateway, Result};
use async_trait::async_trait;
use serde::Deserialize;
use sop_core::model::Document;

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

/// Error body shape the backend uses for validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpGateway {
    /// Build a gateway against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map a non-success response to a plain fetch error.
    fn check(res: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if res.status().is_success() {
            Ok(res)
        } else {
            Err(ClientError::Fetch(format!("{context}: HTTP {}", res.status())))
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder, context: &str) -> Result<reqwest::Response> {
        let res = req
            .send()
            .await
            .map_err(|e| ClientError::Fetch(format!("{context}: {e}")))?;
        Self::check(res, context)
    }
}

#[async_trait]
impl DocumentGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<Document>> {
        let res = self
            .send(self.client.get(self.url("/sops")), "Failed to fetch SOPs")
            .await?;
        res.json()
            .await
            .map_err(|e| ClientError::Fetch(format!("Failed to fetch SOPs: {e}")))
    }

    async fn create(&self, doc: &Document) -> Result<Document> {
        let res = self
            .client
            .post(self.url("/sops"))
            .json(doc)
            .send()
            .await
            .map_err(|e| ClientError::Fetch(format!("Failed to create SOP: {e}")))?;

        if !res.status().is_success() {
            // The backend explains validation failures in the body
            let message = match res.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => "Failed to create SOP".to_string(),
            };
            return Err(ClientError::Validation(message));
        }
        res.json()
            .await
            .map_err(|e| ClientError::Fetch(format!("Failed to create SOP: {e}")))
    }

    async fn update(&self, id: &str, doc: &Document) -> Result<Document> {
        let res = self
            .send(
                self.client.put(self.url(&format!("/sops/{id}"))).json(doc),
                "Failed to update SOP",
            )
            .await?;
        res.json()
            .await
            .map_err(|e| ClientError::Fetch(format!("Failed to update SOP: {e}")))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.send(
            self.client.delete(self.url(&format!("/sops/{id}"))),
            "Failed to delete SOP",
        )
        .await?;
        Ok(())
    }

    async fn import(&self, docs: &[Document]) -> Result<()> {
        self.send(
            self.client.post(self.url("/sops/import")).json(&docs),
            "Failed to import",
        )
        .await?;
        Ok(())
    }

    async fn seed(&self) -> Result<()> {
        self.send(self.client.post(self.url("/seed")), "Failed to seed")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_base_and_path() {
        let gw = HttpGateway::new("https://tracker.example.com/api").unwrap();
        assert_eq!(gw.url("/sops"), "https://tracker.example.com/api/sops");
        assert_eq!(
            gw.url(&format!("/sops/{}", "sop-1")),
            "https://tracker.example.com/api/sops/sop-1"
        );
    }
}
