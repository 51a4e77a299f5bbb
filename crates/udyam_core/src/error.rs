use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::payload::PayloadErrors;

/// Failure to load or compile the form schema. Always fatal at startup.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed schema JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid pattern for step {step} field '{field}': {source}")]
    InvalidPattern {
        step: u32,
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("step numbers must be positive")]
    InvalidStepNumber,

    #[error("step {0} is declared more than once")]
    DuplicateStep(u32),

    #[error("step {step} declares field '{field}' more than once")]
    DuplicateField { step: u32, field: String },
}

/// Failure inside a `SubmissionStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Outcome of a rejected validate/submit call.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid payload")]
    InvalidPayload(PayloadErrors),

    #[error("validation failed: {} field(s)", .0.len())]
    ValidationFailed(BTreeMap<String, String>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistrationError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidPayload(_) | Self::ValidationFailed(_) => 400,
            Self::Store(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_client_errors() {
        let payload = RegistrationError::InvalidPayload(PayloadErrors::default());
        assert_eq!(payload.http_status(), 400);

        let mut errors = BTreeMap::new();
        errors.insert("pan".to_string(), "PAN Number format is invalid".to_string());
        assert_eq!(RegistrationError::ValidationFailed(errors).http_status(), 400);
    }

    #[test]
    fn http_status_store_fault() {
        let err = RegistrationError::Store(StoreError::Internal(anyhow::anyhow!("pool closed")));
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.to_string(), "internal: pool closed");
    }

    #[test]
    fn display_validation_failed_count() {
        let mut errors = BTreeMap::new();
        errors.insert("pan".to_string(), "x".to_string());
        errors.insert("city".to_string(), "y".to_string());
        let err = RegistrationError::ValidationFailed(errors);
        assert_eq!(err.to_string(), "validation failed: 2 field(s)");
    }
}
