//! udyam_core - pure domain logic for the Udyam registration flow.
//!
//! Holds the form schema, the field validator shared by the wizard and the
//! HTTP boundary, the submission service and the `SubmissionStore` port.
//! Postgres lives in `udyam_postgres`, HTTP in the root `udyam` crate.

pub mod error;
pub mod memory;
pub mod payload;
pub mod ports;
pub mod schema;
pub mod service;
pub mod types;
pub mod validation;
pub mod wizard;

pub use error::{RegistrationError, SchemaError, StoreError};
pub use schema::{SchemaProvider, SchemaSource};
pub use service::RegistrationService;
pub use types::{FieldDefinition, FieldType, FormData, FormSchema, StepDefinition};
pub use validation::{ValidationMode, ValidationResult};
