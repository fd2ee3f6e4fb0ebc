//! Credential factory contract.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use drivelink_common::Result;

/// A live credential for calling the remote storage API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer value presented to the API (access token or signed grant).
    pub access_token: String,
    /// Refresh token, when the flow produced one.
    pub refresh_token: Option<String>,
    /// When the access token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Check if the credential is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        // Consider expired if less than 5 minutes remaining
        match self.expires_at {
            Some(expires_at) => expires_at < Utc::now() + Duration::minutes(5),
            None => false,
        }
    }
}

/// Produces a live credential for a given user identifier.
///
/// Implementations hold only immutable identity material and must be safe
/// to call from multiple concurrent request-handling tasks. `Ok(None)`
/// means no credential exists for the user; errors are reserved for
/// failures building one.
#[async_trait]
pub trait CredentialFactory: Send + Sync {
    /// Build a credential for `user`.
    ///
    /// # Errors
    /// - Key material cannot be loaded or signing fails
    /// - Token store I/O fails
    async fn build(&self, user: &str) -> Result<Option<Credential>>;
}
