//! Directory server collaborator contracts.
//!
//! # Responsibility
//! - Define the REST collaborator traits the dashboard core calls.
//! - Pin the exact wire payload shapes for transport implementors.
//!
//! # Invariants
//! - Payload field names match the server JSON byte-for-byte.
//! - No HTTP machinery lives in this crate; implementors own transport,
//!   authentication and multipart framing.

use std::error::Error;
use std::fmt;

pub mod family_api;
pub mod memory;
pub mod roster_api;

/// Result alias for collaborator calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure envelope shared by every collaborator trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection-level failure before any status line arrived.
    Transport(String),
    /// Non-success HTTP status with the server's message.
    Status { code: u16, message: String },
    /// The addressed resource does not exist.
    NotFound(String),
    /// A response body could not be interpreted.
    InvalidData(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(message) => write!(f, "transport failure: {message}"),
            ApiError::Status { code, message } => {
                write!(f, "server rejected the call ({code}): {message}")
            }
            ApiError::NotFound(resource) => write!(f, "not found: {resource}"),
            ApiError::InvalidData(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl Error for ApiError {}
