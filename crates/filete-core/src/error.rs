//! Error types for the browser core.
//!
//! - [`FetchError`] - transport and HTTP failures of a single request
//! - [`CredentialError`] - the user declined to provide a session token
//! - [`TreeError`] - an operation addressed a node that cannot take it
//! - [`SaveError`] - the platform could not hand a file to the user
//! - [`DownloadError`] - everything that can stop a download

use thiserror::Error;

use crate::tree::NodeId;

/// Network/fetch-related errors for HTTP requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Browser window not available
    #[error("Browser window not available")]
    NoWindow,
    /// Failed to create HTTP request
    #[error("Failed to create request")]
    RequestCreationFailed,
    /// Network request failed (CORS, connection reset, ...)
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response, with the body text the server sent
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },
    /// Failed to read response body
    #[error("Failed to read response")]
    ResponseReadFailed,
    /// Invalid response object
    #[error("Invalid response content")]
    InvalidContent,
    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    /// The listing does not describe the requested directory
    #[error("Unexpected listing: {0}")]
    UnexpectedListing(String),
    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl FetchError {
    /// True when the server refused the session token (401 or 403).
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Http { status: 401 | 403, .. })
    }
}

/// Session token acquisition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The user dismissed the token prompt.
    #[error("session token entry cancelled")]
    Cancelled,
}

/// Errors raised by tree state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No node with this id exists in the current forest.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    /// The node belongs to a forest that a refresh has since replaced.
    #[error("node {0} belongs to a replaced forest")]
    StaleNode(NodeId),
    /// Expansion was requested for something that is not a directory.
    #[error("node {0} is not a directory")]
    NotADirectory(NodeId),
}

/// The platform failed to save a downloaded payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SaveError(pub String);

/// Download errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    /// `download` was asked to fetch a directory.
    #[error("'{0}' is not a file")]
    NotAFile(String),
    /// `download_archive` was asked to fetch a file.
    #[error("'{0}' is not a directory")]
    NotADirectory(String),
    /// The user dismissed the token prompt.
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// The request itself failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The server answered with an error status.
    #[error("download rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    /// The payload could not be handed to the user.
    #[error("failed to save file: {0}")]
    Save(#[from] SaveError),
}

impl DownloadError {
    /// True when the failure was the user backing out, not a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Credential(CredentialError::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_rejection() {
        let unauthorized = FetchError::Http {
            status: 401,
            body: "Missing bearer token".to_string(),
        };
        let forbidden = FetchError::Http {
            status: 403,
            body: "Invalid bearer token".to_string(),
        };
        let missing = FetchError::Http {
            status: 404,
            body: "not found".to_string(),
        };

        assert!(unauthorized.is_auth_rejection());
        assert!(forbidden.is_auth_rejection());
        assert!(!missing.is_auth_rejection());
        assert!(!FetchError::Timeout.is_auth_rejection());
    }

    #[test]
    fn test_http_error_carries_body() {
        let err = FetchError::Http {
            status: 500,
            body: "Invalid rootDirHash".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 500: Invalid rootDirHash");
    }

    #[test]
    fn test_download_error_cancelled() {
        let err = DownloadError::from(CredentialError::Cancelled);
        assert!(err.is_cancelled());
        assert!(!DownloadError::NotAFile("docs".to_string()).is_cancelled());
    }
}
