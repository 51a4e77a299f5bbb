//! Port traits implemented by storage adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{NewSubmission, SubmissionRecord};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Append-only store of accepted submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist one submission and return the stored row with its generated id.
    async fn insert(&self, submission: NewSubmission) -> Result<SubmissionRecord>;

    async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>>;

    async fn count(&self) -> Result<u64>;
}
