//! GET /api/schema - the form schema the wizard renders from.

use std::sync::Arc;

use axum::{Extension, Json};
use udyam_core::{FormSchema, RegistrationService};

pub async fn get_schema(
    Extension(service): Extension<Arc<RegistrationService>>,
) -> Json<FormSchema> {
    Json(service.schema().clone())
}
