//! REST API for the registration wizard.
//!
//! GET  /health        - liveness
//! GET  /api/schema    - form schema
//! POST /api/validate  - validate one step payload
//! POST /api/submit    - validate and persist one step payload

pub mod handlers;
pub mod router;

pub use router::build_router;
