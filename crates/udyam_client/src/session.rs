//! WizardSession - drives a `Wizard` against the backend.
//!
//! Loads the schema from the server, prefills state/city from the PIN code
//! lookup and submits the final step. Lookup failures are logged and
//! otherwise ignored; they never block submission.

use std::sync::Arc;

use udyam_core::wizard::{Wizard, PINCODE_FIELD};
use udyam_core::SchemaProvider;
use uuid::Uuid;

use crate::http::RegistrationClient;
use crate::postal::PostalLookup;
use crate::{ClientError, Result};

pub struct WizardSession {
    client: RegistrationClient,
    postal: Arc<dyn PostalLookup>,
    wizard: Wizard,
    loading: bool,
    failure: Option<&'static str>,
}

/// Shown to the user when a submission is rejected or cannot be sent.
pub const SUBMIT_FAILED: &str = "Submission failed. Please try again.";

impl WizardSession {
    /// Fetch the schema from the server and start on the first step.
    pub async fn start(client: RegistrationClient, postal: Arc<dyn PostalLookup>) -> Result<Self> {
        let schema = client.get_schema().await?;
        let provider = SchemaProvider::new(schema)?;
        Ok(Self::with_schema(client, postal, Arc::new(provider)))
    }

    pub fn with_schema(
        client: RegistrationClient,
        postal: Arc<dyn PostalLookup>,
        schema: Arc<SchemaProvider>,
    ) -> Self {
        Self {
            client,
            postal,
            wizard: Wizard::new(schema),
            loading: false,
            failure: None,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Generic message for the last failed submit, cleared on the next attempt.
    pub fn failure(&self) -> Option<&'static str> {
        self.failure
    }

    /// Update a field; a well-formed PIN code triggers the state/city prefill.
    pub async fn set_value(&mut self, field: &str, value: impl Into<String>) {
        self.wizard.set_value(field, value);
        if field == PINCODE_FIELD {
            self.prefill_from_pincode().await;
        }
    }

    async fn prefill_from_pincode(&mut self) {
        let Some(pin) = self.wizard.pincode_for_lookup().map(str::to_string) else {
            return;
        };
        match self.postal.lookup(&pin).await {
            Ok(Some(location)) => self.wizard.apply_postal_location(&location),
            Ok(None) => tracing::debug!(pincode = %pin, "no post office for pincode"),
            Err(e) => tracing::debug!(pincode = %pin, error = %e, "pincode lookup failed"),
        }
    }

    pub fn next(&mut self) -> bool {
        self.wizard.next()
    }

    pub fn back(&mut self) -> bool {
        self.wizard.back()
    }

    /// Submit the active step. Only allowed once every field on it passes.
    pub async fn submit(&mut self) -> Result<Uuid> {
        if !self.wizard.can_continue() {
            return Err(ClientError::StepIncomplete);
        }
        self.loading = true;
        self.failure = None;
        let result = self.client.submit(&self.wizard.submission_payload()).await;
        self.loading = false;

        let id = result.inspect_err(|e| {
            tracing::warn!(error = %e, "submission failed");
            self.failure = Some(SUBMIT_FAILED);
        })?;
        self.wizard.mark_submitted();
        Ok(id)
    }

    /// Clear the form after a completed registration.
    pub fn start_over(&mut self) {
        self.failure = None;
        self.wizard.reset();
    }
}
