//! Error types for remote platform calls.
//!
//! Branching on failures (for example "the domain is gone" while waiting for
//! a deletion) goes through these variants, never through the text of a
//! server message.

use thiserror::Error;

/// Errors returned by the platform client.
#[derive(Debug, Error)]
pub enum SdkError {
    /// The requested resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Kind or identifier of the missing resource.
        resource: String,
    },

    /// The resource exists but has not passed verification yet.
    #[error("not verified: {message}")]
    NotVerified {
        /// Server message.
        message: String,
    },

    /// A resource with the same identity already exists.
    #[error("already exists: {message}")]
    AlreadyExists {
        /// Server message.
        message: String,
    },

    /// The resource belongs to another account or project.
    #[error("not owned: {message}")]
    NotOwned {
        /// Server message.
        message: String,
    },

    /// The personal access token was rejected.
    #[error("authentication failed: {message}")]
    Unauthenticated {
        /// Server message.
        message: String,
    },

    /// Any other GraphQL error.
    #[error("{message}")]
    GraphQl {
        /// Server message.
        message: String,
        /// `extensions.code`, when the server sent one.
        code: Option<String>,
    },

    /// Non-success HTTP status without a GraphQL error body.
    #[error("request failed with status {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("client error: {0}")]
    Client(String),
}

impl SdkError {
    /// Classifies a GraphQL error by its `extensions.code`.
    #[must_use]
    pub fn from_graphql(message: String, code: Option<&str>, resource: &str) -> Self {
        match code {
            Some("NOT_FOUND") => Self::NotFound {
                resource: resource.to_string(),
            },
            Some("NOT_VERIFIED") => Self::NotVerified { message },
            Some("ALREADY_EXISTS" | "CONFLICT") => Self::AlreadyExists { message },
            Some("NOT_OWNED" | "FORBIDDEN") => Self::NotOwned { message },
            Some("UNAUTHENTICATED") => Self::Unauthenticated { message },
            other => Self::GraphQl {
                message,
                code: other.map(str::to_string),
            },
        }
    }

    /// Returns true if the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
