//! HTTP client for the registration REST API.

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use udyam_core::payload::SubmissionPayload;
use udyam_core::FormSchema;
use uuid::Uuid;

use crate::{ClientError, Result};

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Clone)]
pub struct RegistrationClient {
    client: reqwest::Client,
    base_url: String,
}

impl RegistrationClient {
    /// `base_url` is the server root, e.g. `http://localhost:4000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<bool> {
        let resp = self.client.get(self.url("/health")).send().await?;
        let health: HealthResponse = json_or_status(resp).await?;
        Ok(health.status == "ok")
    }

    pub async fn get_schema(&self) -> Result<FormSchema> {
        let resp = self.client.get(self.url("/api/schema")).send().await?;
        json_or_status(resp).await
    }

    /// `Ok(())` when the server accepts the payload; a 400 comes back as
    /// `ClientError::Status` with the server's error body.
    pub async fn validate(&self, payload: &SubmissionPayload) -> Result<()> {
        let resp = self
            .client
            .post(self.url("/api/validate"))
            .json(payload)
            .send()
            .await?;
        let _: serde_json::Value = json_or_status(resp).await?;
        Ok(())
    }

    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<Uuid> {
        let resp = self
            .client
            .post(self.url("/api/submit"))
            .json(payload)
            .send()
            .await?;
        let body: SubmitResponse = json_or_status(resp).await?;
        Ok(body.id)
    }
}

async fn json_or_status<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}
