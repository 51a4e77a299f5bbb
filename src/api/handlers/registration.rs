//! Step payload handlers.
//!
//! POST /api/validate - `{step, data, mode?}` → `{ok: true}` or 400
//! POST /api/submit   - `{step, data}` → `{id}` or 400
//!
//! Bodies are taken as raw JSON so structural problems come back in the
//! same `{error, details}` shape as validation failures.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use udyam_core::payload::SubmissionPayload;
use udyam_core::RegistrationService;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: Uuid,
}

pub async fn validate(
    Extension(service): Extension<Arc<RegistrationService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValidateResponse>, AppError> {
    let Json(body) = body?;
    let payload = SubmissionPayload::from_json(&body)?;
    service.validate(&payload)?;
    Ok(Json(ValidateResponse { ok: true }))
}

pub async fn submit(
    Extension(service): Extension<Arc<RegistrationService>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(body) = body?;
    let payload = SubmissionPayload::from_json(&body)?;
    let id = service.submit(&payload).await?;
    Ok(Json(SubmitResponse { id }))
}
