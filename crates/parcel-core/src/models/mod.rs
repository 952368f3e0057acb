//! Data models for the upload lifecycle
//!
//! Request/response bodies exchanged over HTTP and the durable upload record.

mod upload;

pub use upload::*;
