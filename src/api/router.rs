//! Router construction for the registration server.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use udyam_core::RegistrationService;

use crate::api::handlers;

/// Build the full axum router with all routes and middleware.
pub fn build_router(service: Arc<RegistrationService>) -> Router {
    let api = Router::new()
        .route("/schema", get(handlers::schema::get_schema))
        .route("/validate", post(handlers::registration::validate))
        .route("/submit", post(handlers::registration::submit));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(Extension(service))
}
