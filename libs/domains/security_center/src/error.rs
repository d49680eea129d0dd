use std::time::Duration;

use thiserror::Error;

/// Result type for resource operations
pub type SecurityCenterResult<T> = Result<T, SecurityCenterError>;

/// Result type for management API calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the pricing resource to the lifecycle engine
#[derive(Debug, Error)]
pub enum SecurityCenterError {
    /// The update call failed (including deadline/cancellation)
    #[error("Error creating/updating Security Center Subscription pricing {name:?}: {source}")]
    RemoteWrite {
        name: String,
        #[source]
        source: ClientError,
    },

    /// The fetch call failed for a reason other than not-found
    #[error("Error reading Security Center Subscription pricing {name:?}: {source}")]
    RemoteRead {
        name: String,
        #[source]
        source: ClientError,
    },

    /// The fetch succeeded but carried no identifier
    #[error("Security Center Subscription pricing {0:?} returned no ID")]
    MissingIdentifier(String),

    #[error("Invalid pricing tier {value:?}: expected one of {expected}")]
    InvalidTier { value: String, expected: String },

    #[error("Invalid Security Center pricing ID {id:?}: {reason}")]
    InvalidIdentifier { id: String, reason: String },

    #[error("Cannot import Security Center Subscription pricing {0:?}: not found")]
    ImportNotFound(String),

    /// A delete policy that touches the service failed to do so
    #[error("Error deleting Security Center Subscription pricing {name:?}: {source}")]
    DeleteFailed {
        name: String,
        #[source]
        source: ClientError,
    },
}

/// Errors from the management API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered 404 for the pricing
    #[error("Pricing not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}
