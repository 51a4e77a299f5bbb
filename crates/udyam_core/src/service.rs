//! RegistrationService - the validate/submit operations behind the HTTP API.
//!
//! Takes the schema and the store via `Arc` so the same logic runs against
//! Postgres in production and the in-memory store in tests.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::RegistrationError;
use crate::payload::SubmissionPayload;
use crate::ports::SubmissionStore;
use crate::schema::SchemaProvider;
use crate::types::{FormSchema, NewSubmission};
use crate::validation::{validate, validate_submission, ValidationResult};

pub type Result<T> = std::result::Result<T, RegistrationError>;

pub struct RegistrationService {
    schema: Arc<SchemaProvider>,
    store: Arc<dyn SubmissionStore>,
}

impl RegistrationService {
    pub fn new(schema: Arc<SchemaProvider>, store: Arc<dyn SubmissionStore>) -> Self {
        Self { schema, store }
    }

    pub fn schema(&self) -> &FormSchema {
        self.schema.get_schema()
    }

    /// Run the validator in the payload's mode. No side effects.
    pub fn validate(&self, payload: &SubmissionPayload) -> Result<()> {
        payload
            .check_declared(&self.schema)
            .map_err(RegistrationError::InvalidPayload)?;
        let result = validate(&self.schema, payload.step, &payload.data, payload.mode());
        into_outcome(payload.step, result)
    }

    /// Validate the step in complete mode, plus any values supplied for other
    /// steps, and persist one row.
    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<Uuid> {
        payload
            .check_declared(&self.schema)
            .map_err(RegistrationError::InvalidPayload)?;
        let result = validate_submission(&self.schema, payload.step, &payload.data);
        into_outcome(payload.step, result)?;

        let new = NewSubmission::from_payload(payload)
            .map_err(crate::error::StoreError::from)?;
        let record = self.store.insert(new).await?;
        tracing::info!(id = %record.id, step = record.step, "submission stored");
        Ok(record.id)
    }
}

fn into_outcome(step: u32, result: ValidationResult) -> Result<()> {
    if result.ok {
        return Ok(());
    }
    tracing::debug!(
        step,
        fields = ?result.errors.keys().collect::<Vec<_>>(),
        "validation failed"
    );
    Err(RegistrationError::ValidationFailed(result.errors))
}
