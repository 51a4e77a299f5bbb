//! In-memory `SubmissionStore`, used when no database is configured and in tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::ports::{Result, SubmissionStore};
use crate::types::{NewSubmission, SubmissionRecord};

#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    rows: RwLock<Vec<SubmissionRecord>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn insert(&self, submission: NewSubmission) -> Result<SubmissionRecord> {
        let record = SubmissionRecord::from_new(Uuid::new_v4(), Utc::now(), submission);
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.read().await.len() as u64)
    }
}
