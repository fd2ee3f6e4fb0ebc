//! OAuth2 provider registry collaborator interface.
//!
//! The registry is a durable, host-owned store of OAuth2 client
//! registrations keyed by provider id, with a per-user token store reachable
//! through each provider. This subsystem never owns that state; it only
//! reads and (once) creates registrations through these traits.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use drivelink_common::Result;

use crate::factory::Credential;

/// A persisted OAuth2 client registration.
///
/// Created once per provider id and never overwritten by later
/// activations; deletion, if any, is entirely the registry's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2ClientRegistration {
    /// Unique key identifying this registration within the registry.
    pub provider_id: String,
    /// Token endpoint URL.
    pub token_endpoint: String,
    /// Authorization endpoint URL.
    pub authorization_endpoint: String,
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Scopes requested during the authorization-code flow.
    pub scopes: Vec<String>,
}

/// A token record stored against a user identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// User the token was issued for.
    pub user_id: String,
    /// Access token value.
    pub access_token: String,
    /// Durable refresh token, when offline access was granted.
    pub refresh_token: Option<String>,
    /// When the access token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Check if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at < Utc::now() + Duration::minutes(5),
            None => false,
        }
    }

    /// Convert into a live credential.
    pub fn into_credential(self) -> Credential {
        Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at,
        }
    }
}

/// One registered OAuth2 provider, with its token store.
#[async_trait]
pub trait OAuth2Provider: Send + Sync {
    /// The persisted registration backing this provider.
    fn registration(&self) -> &OAuth2ClientRegistration;

    /// Load the stored token for `user`, if any.
    ///
    /// # Errors
    /// - Backing store I/O failed
    async fn load_credential(&self, user: &str) -> Result<Option<StoredToken>>;

    /// Store (or replace) the token for `token.user_id`.
    ///
    /// # Errors
    /// - Backing store I/O failed
    async fn store_credential(&self, token: StoredToken) -> Result<()>;
}

/// Durable store of OAuth2 client registrations keyed by provider id.
///
/// Implementations own uniqueness of provider ids: `add_provider` for an
/// id that already exists must fail with `Error::AlreadyExists` rather
/// than replace the stored registration.
#[async_trait]
pub trait OAuth2ProviderRegistry: Send + Sync {
    /// Look up the provider registered under `provider_id`.
    ///
    /// # Errors
    /// - `Error::RegistryUnavailable` if the registry cannot be reached
    async fn get_provider(&self, provider_id: &str) -> Result<Option<Arc<dyn OAuth2Provider>>>;

    /// Create a new provider registration.
    ///
    /// # Errors
    /// - `Error::RegistryUnavailable` if the registry cannot be reached
    /// - `Error::AlreadyExists` if the provider id is taken
    async fn add_provider(
        &self,
        registration: OAuth2ClientRegistration,
    ) -> Result<Arc<dyn OAuth2Provider>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_token_expiration() {
        let token = StoredToken {
            user_id: "alice".to_string(),
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(Utc::now() - Duration::minutes(1)),
        };
        assert!(token.is_expired());

        let token = StoredToken {
            expires_at: Some(Utc::now() + Duration::hours(1)),
            ..token
        };
        assert!(!token.is_expired());
    }

    #[test]
    fn test_stored_token_into_credential() {
        let expires_at = Utc::now() + Duration::hours(1);
        let token = StoredToken {
            user_id: "alice".to_string(),
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(expires_at),
        };

        let credential = token.into_credential();
        assert_eq!(credential.access_token, "access");
        assert_eq!(credential.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(credential.expires_at, Some(expires_at));
    }

    #[test]
    fn test_registration_serialization() {
        let registration = OAuth2ClientRegistration {
            provider_id: "GoogleDrive".to_string(),
            token_endpoint: crate::GOOGLE_TOKEN_URL.to_string(),
            authorization_endpoint: crate::GOOGLE_AUTH_URL.to_string(),
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![crate::DRIVE_READONLY_SCOPE.to_string()],
        };

        let json = serde_json::to_string(&registration).unwrap();
        let deserialized: OAuth2ClientRegistration = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.provider_id, registration.provider_id);
        assert_eq!(deserialized.client_secret, registration.client_secret);
        assert_eq!(deserialized.scopes, registration.scopes);
    }
}
