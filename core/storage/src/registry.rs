//! Prefix-keyed blob provider registry.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use drivelink_common::{Error, Result};

use crate::provider::BlobProvider;

/// Registry of blob providers keyed by URI-scheme-like prefix.
///
/// Held by the host's blob manager; this subsystem registers exactly one
/// provider under its fixed prefix at activation and removes it at
/// deactivation.
#[derive(Default)]
pub struct BlobProviderRegistry {
    providers: RwLock<HashMap<String, Arc<BlobProvider>>>,
}

impl BlobProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under `prefix`.
    ///
    /// # Errors
    /// - Returns `Error::AlreadyExists` if the prefix is taken
    pub async fn register(&self, prefix: impl Into<String>, provider: BlobProvider) -> Result<()> {
        let prefix = prefix.into();
        let mut providers = self.providers.write().await;
        if providers.contains_key(&prefix) {
            return Err(Error::AlreadyExists(format!(
                "Blob provider '{}' is already registered",
                prefix
            )));
        }
        providers.insert(prefix, Arc::new(provider));
        Ok(())
    }

    /// Unregister the provider under `prefix`.
    ///
    /// Idempotent: returns `false` if no provider was registered.
    pub async fn unregister(&self, prefix: &str) -> bool {
        self.providers.write().await.remove(prefix).is_some()
    }

    /// Resolve the provider registered under `prefix`.
    pub async fn get(&self, prefix: &str) -> Option<Arc<BlobProvider>> {
        self.providers.read().await.get(prefix).cloned()
    }

    /// Check if a provider is registered under `prefix`.
    pub async fn has_provider(&self, prefix: &str) -> bool {
        self.providers.read().await.contains_key(prefix)
    }

    /// Get the list of registered prefixes.
    pub async fn prefixes(&self) -> Vec<String> {
        self.providers.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use drivelink_credential::{Credential, CredentialFactory};

    struct NullFactory;

    #[async_trait]
    impl CredentialFactory for NullFactory {
        async fn build(&self, _user: &str) -> Result<Option<Credential>> {
            Ok(None)
        }
    }

    fn test_provider(client_id: &str) -> BlobProvider {
        BlobProvider::new(Arc::new(NullFactory), client_id)
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = BlobProviderRegistry::new();
        registry
            .register("googledrive", test_provider("cid"))
            .await
            .unwrap();

        let provider = registry.get("googledrive").await.unwrap();
        assert_eq!(provider.client_id(), "cid");
        assert!(registry.has_provider("googledrive").await);
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let registry = BlobProviderRegistry::new();
        registry
            .register("googledrive", test_provider("a"))
            .await
            .unwrap();

        let result = registry.register("googledrive", test_provider("b")).await;
        assert!(matches!(result, Err(Error::AlreadyExists(_))));

        // The original registration survives
        assert_eq!(registry.get("googledrive").await.unwrap().client_id(), "a");
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = BlobProviderRegistry::new();
        registry
            .register("googledrive", test_provider("cid"))
            .await
            .unwrap();

        assert!(registry.unregister("googledrive").await);
        assert!(!registry.unregister("googledrive").await);
        assert!(!registry.has_provider("googledrive").await);
    }

    #[tokio::test]
    async fn test_prefixes_list() {
        let registry = BlobProviderRegistry::new();
        registry.register("a", test_provider("x")).await.unwrap();
        registry.register("b", test_provider("y")).await.unwrap();

        let prefixes = registry.prefixes().await;
        assert!(prefixes.contains(&"a".to_string()));
        assert!(prefixes.contains(&"b".to_string()));
    }
}
