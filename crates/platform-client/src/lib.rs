//! # Platform Client
//!
//! Typed client for the remote platform's resource API.
//!
//! The [`ResourceClient`] trait exposes one operation per resource or
//! association kind; [`GraphQlClient`] implements it over HTTP. Callers
//! never see transport details: a failed operation surfaces as a
//! [`ClientError`], and the only classification callers may rely on is
//! [`ClientError::is_already_exists`].

#![warn(missing_docs)]

mod client;
mod conflict;
mod graphql;
mod types;

pub use client::ResourceClient;
pub use graphql::GraphQlClient;
pub use types::{
    BillingGroup, Environment, EnvVar, Group, NotificationRecord, Project, SshKeyRecord, User,
};

use thiserror::Error;

/// Errors produced by resource API operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The target object already exists server-side. Only produced by
    /// operations that can legitimately conflict (project creation,
    /// environment create-or-update).
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// The API rejected the operation for any other reason
    #[error("api error: {message}")]
    Api {
        /// Server-supplied error message
        message: String,
    },

    /// HTTP transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response payload could not be decoded
    #[error("couldn't decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response carried no data for the requested field
    #[error("response missing data for '{field}'")]
    MissingData {
        /// The response field that was expected
        field: &'static str,
    },

    /// The operation was cancelled before completion
    #[error("operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// Whether this error represents an existence conflict.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ClientError::AlreadyExists(_))
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
