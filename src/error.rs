//! HTTP error mapping.
//!
//! Client errors carry `{error, details}` with status 400. Store faults are
//! logged and surface as an opaque 500.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use udyam_core::payload::PayloadErrors;
use udyam_core::RegistrationError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug)]
pub struct AppError(pub RegistrationError);

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        Self(err)
    }
}

impl From<PayloadErrors> for AppError {
    fn from(errors: PayloadErrors) -> Self {
        Self(RegistrationError::InvalidPayload(errors))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        PayloadErrors::form(rejection.body_text()).into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match self.0 {
            RegistrationError::InvalidPayload(errors) => ErrorBody {
                error: "Invalid payload".into(),
                details: serde_json::to_value(errors).ok(),
            },
            RegistrationError::ValidationFailed(errors) => ErrorBody {
                error: "Validation failed".into(),
                details: serde_json::to_value(errors).ok(),
            },
            RegistrationError::Store(err) => {
                tracing::error!(error = %err, "submission store failure");
                ErrorBody {
                    error: "Internal server error".into(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
