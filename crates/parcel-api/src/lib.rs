//! Parcel API Library
//!
//! HTTP surface of the upload lifecycle service. Exposed as a library so the binary and
//! the integration tests build the same router.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
