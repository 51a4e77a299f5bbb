//! PIN code → state/city lookup against the India Post pincode API.

use async_trait::async_trait;
use serde::Deserialize;
use udyam_core::wizard::PostalLocation;

use crate::{ClientError, Result};

pub const DEFAULT_POSTAL_API: &str = "https://api.postalpincode.in";

#[async_trait]
pub trait PostalLookup: Send + Sync {
    /// Location of the first post office registered for `pincode`, if any.
    async fn lookup(&self, pincode: &str) -> Result<Option<PostalLocation>>;
}

#[derive(Debug, Deserialize)]
struct PincodeResponse {
    #[serde(rename = "PostOffice", default)]
    post_office: Option<Vec<PostOffice>>,
}

#[derive(Debug, Deserialize)]
struct PostOffice {
    #[serde(rename = "State", default)]
    state: Option<String>,
    #[serde(rename = "Block", default)]
    block: Option<String>,
    #[serde(rename = "District", default)]
    district: Option<String>,
}

impl From<PostOffice> for PostalLocation {
    fn from(office: PostOffice) -> Self {
        PostalLocation {
            state: office.state,
            block: office.block,
            district: office.district,
        }
    }
}

/// Reads `GET <base>/pincode/<pin>`, a one-element array whose `PostOffice`
/// list is null when the code is unknown.
#[derive(Clone)]
pub struct PostalPincodeClient {
    client: reqwest::Client,
    base_url: String,
}

impl PostalPincodeClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_POSTAL_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for PostalPincodeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostalLookup for PostalPincodeClient {
    async fn lookup(&self, pincode: &str) -> Result<Option<PostalLocation>> {
        let resp = self
            .client
            .get(format!("{}/pincode/{}", self.base_url, pincode))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let body: Vec<PincodeResponse> = resp.json().await?;
        Ok(first_location(body))
    }
}

fn first_location(body: Vec<PincodeResponse>) -> Option<PostalLocation> {
    body.into_iter()
        .next()
        .and_then(|r| r.post_office)
        .and_then(|offices| offices.into_iter().next())
        .map(PostalLocation::from)
}
