use thiserror::Error;
use uuid::Uuid;

/// Result type for architecture operations
pub type ArchitectureResult<T> = Result<T, ArchitectureError>;

/// Errors that can occur in the architecture domain
///
/// Catalog misses (unknown service id or region code) are not represented here:
/// they are absorbed with safe defaults where they happen.
#[derive(Debug, Error)]
pub enum ArchitectureError {
    /// Saved architecture not found
    #[error("Architecture not found: {0}")]
    NotFound(Uuid),

    /// User input rejected before reaching the gateway, or by the gateway itself
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing or rejected bearer credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Gateway answered with an unexpected status
    #[error("Gateway error ({status}): {message}")]
    Gateway { status: u16, message: String },

    /// Transport-level failure talking to the gateway
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A catalog violates its invariants
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for ArchitectureError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
