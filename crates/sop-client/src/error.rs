//! Error taxonomy for remote operations.

use thiserror::Error;

/// Everything that can go wrong talking to the backend or the CDN.
///
/// None of these are fatal: a failed mutation is never partially applied, so
/// the cache and the remote collection stay in a previously-valid state and
/// the caller may simply retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Non-2xx response with no usable body.
    #[error("{0}")]
    Fetch(String),

    /// Non-2xx response carrying a server-supplied message (e.g. a missing
    /// required field on create).
    #[error("{0}")]
    Validation(String),

    /// Upload endpoint failure.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Malformed import JSON.
    #[error("could not parse import data: {0}")]
    Parse(String),

    /// Upload backend not configured client-side; no network call was made.
    #[error("upload service is not configured")]
    Configuration,

    /// Edit requested for a document id absent from the cache.
    #[error("no document with id {0}")]
    NotFound(String),
}
