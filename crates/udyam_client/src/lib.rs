//! udyam_client - talks to the registration backend on behalf of a front end.
//!
//! `RegistrationClient` wraps the REST API, `PostalLookup` resolves PIN codes
//! to state/city, and `WizardSession` ties both to the headless
//! `udyam_core::wizard::Wizard`.

pub mod http;
pub mod postal;
pub mod session;

pub use http::RegistrationClient;
pub use postal::{PostalLookup, PostalPincodeClient};
pub use session::WizardSession;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid schema from server: {0}")]
    Schema(#[from] udyam_core::SchemaError),

    #[error("current step has missing or invalid fields")]
    StepIncomplete,
}
