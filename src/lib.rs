//! udyam - HTTP backend for the Udyam registration wizard.
//!
//! Serves the form schema, validates step payloads and stores accepted
//! submissions. Domain logic lives in `udyam_core`; this crate wires it to
//! axum, configuration and logging.

pub mod config;
pub mod store;
pub mod telemetry;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod error;

pub use config::ServerConfig;
