//! API constants

/// Versioned prefix every upload route lives under
pub const API_PREFIX: &str = "/api/v1";

/// Upload endpoints only take small JSON bodies
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;
