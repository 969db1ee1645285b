//! Patient REST API.
//!
//! Exposes the patient repository as HTTP endpoints under `/api/`.
//! `patients_api_router()` returns a `Router` that can be mounted on
//! any axum server; `start_api_server_on()` runs one in the background.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::patients_api_router;
pub use server::{start_api_server_on, ApiServer, ApiSession, ServerError};
pub use types::ApiContext;
