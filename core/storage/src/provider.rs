//! Registered blob provider value.

use std::sync::Arc;

use drivelink_common::Result;
use drivelink_credential::{Credential, CredentialFactory};

/// A blob provider bound to a credential factory.
///
/// Carries whatever the blob manager needs to authenticate remote file
/// access on behalf of a user: the credential factory selected at
/// activation and the effective public client id (used by file pickers
/// and similar front-end integrations).
pub struct BlobProvider {
    credential_factory: Arc<dyn CredentialFactory>,
    client_id: String,
}

impl BlobProvider {
    /// Create a new blob provider.
    pub fn new(credential_factory: Arc<dyn CredentialFactory>, client_id: impl Into<String>) -> Self {
        Self {
            credential_factory,
            client_id: client_id.into(),
        }
    }

    /// The effective public client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The credential factory backing this provider.
    pub fn credential_factory(&self) -> Arc<dyn CredentialFactory> {
        self.credential_factory.clone()
    }

    /// Build a credential for `user` through the bound factory.
    pub async fn credential(&self, user: &str) -> Result<Option<Credential>> {
        self.credential_factory.build(user).await
    }
}
