//! In-memory OAuth2 provider registry for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use drivelink_common::{Error, Result};

use crate::registry::{OAuth2ClientRegistration, OAuth2Provider, OAuth2ProviderRegistry, StoredToken};

/// In-memory OAuth2 provider.
pub struct MemoryProvider {
    registration: OAuth2ClientRegistration,
    tokens: RwLock<HashMap<String, StoredToken>>,
}

impl MemoryProvider {
    fn new(registration: OAuth2ClientRegistration) -> Self {
        Self {
            registration,
            tokens: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl OAuth2Provider for MemoryProvider {
    fn registration(&self) -> &OAuth2ClientRegistration {
        &self.registration
    }

    async fn load_credential(&self, user: &str) -> Result<Option<StoredToken>> {
        Ok(self.tokens.read().await.get(user).cloned())
    }

    async fn store_credential(&self, token: StoredToken) -> Result<()> {
        self.tokens
            .write()
            .await
            .insert(token.user_id.clone(), token);
        Ok(())
    }
}

/// In-memory OAuth2 provider registry.
///
/// Useful for testing and development. All registrations and tokens are
/// stored in memory and lost on drop.
#[derive(Default)]
pub struct MemoryProviderRegistry {
    providers: RwLock<HashMap<String, Arc<MemoryProvider>>>,
}

impl MemoryProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OAuth2ProviderRegistry for MemoryProviderRegistry {
    async fn get_provider(&self, provider_id: &str) -> Result<Option<Arc<dyn OAuth2Provider>>> {
        let providers = self.providers.read().await;
        Ok(providers
            .get(provider_id)
            .map(|p| p.clone() as Arc<dyn OAuth2Provider>))
    }

    async fn add_provider(
        &self,
        registration: OAuth2ClientRegistration,
    ) -> Result<Arc<dyn OAuth2Provider>> {
        let mut providers = self.providers.write().await;
        if providers.contains_key(&registration.provider_id) {
            return Err(Error::AlreadyExists(format!(
                "Provider '{}' is already registered",
                registration.provider_id
            )));
        }
        let provider = Arc::new(MemoryProvider::new(registration));
        providers.insert(
            provider.registration.provider_id.clone(),
            provider.clone(),
        );
        Ok(provider as Arc<dyn OAuth2Provider>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_registration(provider_id: &str) -> OAuth2ClientRegistration {
        OAuth2ClientRegistration {
            provider_id: provider_id.to_string(),
            token_endpoint: crate::GOOGLE_TOKEN_URL.to_string(),
            authorization_endpoint: crate::GOOGLE_AUTH_URL.to_string(),
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec![crate::DRIVE_READONLY_SCOPE.to_string()],
        }
    }

    #[tokio::test]
    async fn test_add_and_get_provider() {
        let registry = MemoryProviderRegistry::new();

        assert!(registry.get_provider("GoogleDrive").await.unwrap().is_none());

        registry
            .add_provider(test_registration("GoogleDrive"))
            .await
            .unwrap();

        let provider = registry.get_provider("GoogleDrive").await.unwrap().unwrap();
        assert_eq!(provider.registration().client_id, "cid");
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let registry = MemoryProviderRegistry::new();

        registry
            .add_provider(test_registration("GoogleDrive"))
            .await
            .unwrap();

        let result = registry.add_provider(test_registration("GoogleDrive")).await;
        assert!(matches!(result, Err(Error::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_token_store_roundtrip() {
        let registry = MemoryProviderRegistry::new();
        let provider = registry
            .add_provider(test_registration("GoogleDrive"))
            .await
            .unwrap();

        assert!(provider.load_credential("alice").await.unwrap().is_none());

        provider
            .store_credential(StoredToken {
                user_id: "alice".to_string(),
                access_token: "access".to_string(),
                refresh_token: None,
                expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
            })
            .await
            .unwrap();

        let token = provider.load_credential("alice").await.unwrap().unwrap();
        assert_eq!(token.access_token, "access");

        // Other users stay empty
        assert!(provider.load_credential("bob").await.unwrap().is_none());
    }
}
