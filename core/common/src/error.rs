//! Common error types for Drivelink.

use thiserror::Error;

/// Top-level error type for Drivelink operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration value missing, blank, or invalid.
    ///
    /// Fatal during activation: no provider is registered.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The OAuth2 provider registry cannot be reached.
    #[error("OAuth2 provider registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// The OAuth2 provider registry rejected a registration.
    #[error("Provider registration failed: {0}")]
    ProviderRegistration(String),

    /// Building a credential for a single user failed.
    ///
    /// Local to one `build` call; the shared factory stays usable.
    #[error("Credential build failed: {0}")]
    CredentialBuild(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
