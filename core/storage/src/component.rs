//! Provisioning lifecycle component.
//!
//! Selects exactly one credential provisioning strategy at activation,
//! validates its inputs, and registers a blob provider bound to the
//! resulting factory under the fixed prefix. Activation is atomic: any
//! failure leaves the prefix unregistered.

use std::path::PathBuf;
use std::sync::Arc;

use drivelink_common::{Error, Result};
use drivelink_credential::{
    CredentialFactory, OAuth2ProviderRegistry, ServiceAccountCredentialFactory,
    WebApplicationCredentialFactory,
};

use crate::config::{
    HostProperties, ProvisioningConfig, CLIENT_ID_PROP, SERVICE_ACCOUNT_ID_PROP,
    SERVICE_ACCOUNT_KEY_PATH_PROP,
};
use crate::provider::BlobProvider;
use crate::registry::BlobProviderRegistry;

/// Prefix the blob provider is registered under.
pub const GOOGLE_DRIVE_PREFIX: &str = "googledrive";

/// Provider id of the OAuth2 client registration.
pub const GOOGLE_DRIVE_OAUTH_PROVIDER_ID: &str = "GoogleDrive";

/// The provisioning strategy decided once at activation.
///
/// Selection depends solely on the presence of a contributed
/// [`ProvisioningConfig`]; environment-style properties only matter on the
/// service account path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningStrategy {
    /// Non-interactive: sign requests with a private key.
    ServiceAccount {
        service_account_id: String,
        key_path: PathBuf,
        client_id: String,
    },
    /// Interactive OAuth2 authorization-code flow.
    WebApplication {
        client_id: String,
        client_secret: String,
    },
}

fn missing(prop: &str) -> Error {
    Error::Configuration(format!("Missing value for property: {}", prop))
}

impl ProvisioningStrategy {
    /// Select and validate a strategy from the host configuration.
    ///
    /// # Errors
    /// - `Error::Configuration` for a blank required property or a key
    ///   file that does not exist
    pub fn select(
        config: Option<&ProvisioningConfig>,
        properties: &HostProperties,
    ) -> Result<Self> {
        if let Some(config) = config {
            return Ok(Self::WebApplication {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            });
        }

        let service_account_id = properties
            .get(SERVICE_ACCOUNT_ID_PROP)
            .ok_or_else(|| missing(SERVICE_ACCOUNT_ID_PROP))?
            .to_string();

        let key_path = PathBuf::from(
            properties
                .get(SERVICE_ACCOUNT_KEY_PATH_PROP)
                .ok_or_else(|| missing(SERVICE_ACCOUNT_KEY_PATH_PROP))?,
        );
        if !key_path.is_file() {
            return Err(Error::Configuration(format!(
                "No such file: {} for property: {}",
                key_path.display(),
                SERVICE_ACCOUNT_KEY_PATH_PROP
            )));
        }

        let client_id = properties
            .get(CLIENT_ID_PROP)
            .ok_or_else(|| missing(CLIENT_ID_PROP))?
            .to_string();

        Ok(Self::ServiceAccount {
            service_account_id,
            key_path,
            client_id,
        })
    }

    /// The effective public client id carried by the registered provider.
    pub fn client_id(&self) -> &str {
        match self {
            Self::ServiceAccount { client_id, .. } => client_id,
            Self::WebApplication { client_id, .. } => client_id,
        }
    }
}

/// Lifecycle component wiring strategy selection to provider registration.
///
/// Collaborators are injected at construction; `activate` and `deactivate`
/// are invoked by the host exactly once each per component lifecycle,
/// never concurrently with each other.
pub struct ProvisioningCoordinator {
    blob_registry: Arc<BlobProviderRegistry>,
    oauth_registry: Arc<dyn OAuth2ProviderRegistry>,
    properties: HostProperties,
    server_base: String,
    config: Option<ProvisioningConfig>,
    activated: bool,
}

impl ProvisioningCoordinator {
    /// Create a new coordinator.
    ///
    /// `server_base` is the host's public base URL, used to derive the
    /// OAuth2 callback route.
    pub fn new(
        blob_registry: Arc<BlobProviderRegistry>,
        oauth_registry: Arc<dyn OAuth2ProviderRegistry>,
        properties: HostProperties,
        server_base: impl Into<String>,
    ) -> Self {
        Self {
            blob_registry,
            oauth_registry,
            properties,
            server_base: server_base.into(),
            config: None,
            activated: false,
        }
    }

    /// Store a contributed provisioning configuration.
    ///
    /// Last write wins before activation; contributions after activation
    /// are ignored, since activation reads the configuration once.
    pub fn contribute_configuration(&mut self, config: ProvisioningConfig) {
        if self.activated {
            tracing::debug!("Ignoring provisioning configuration contributed after activation");
            return;
        }
        self.config = Some(config);
    }

    /// Select a strategy, build its credential factory, and register the
    /// blob provider under the fixed prefix.
    ///
    /// # Postconditions
    /// - On success exactly one provider is registered under the prefix
    /// - On error the prefix is left unregistered
    ///
    /// # Errors
    /// - `Error::Configuration` for invalid service account inputs
    /// - `Error::RegistryUnavailable` / `Error::ProviderRegistration` from
    ///   the web application initialization
    pub async fn activate(&mut self) -> Result<()> {
        let strategy = ProvisioningStrategy::select(self.config.as_ref(), &self.properties)?;
        let client_id = strategy.client_id().to_string();

        let factory: Arc<dyn CredentialFactory> = match &strategy {
            ProvisioningStrategy::WebApplication {
                client_id,
                client_secret,
            } => Arc::new(
                WebApplicationCredentialFactory::initialize(
                    self.oauth_registry.clone(),
                    GOOGLE_DRIVE_OAUTH_PROVIDER_ID,
                    client_id,
                    client_secret,
                    self.server_base.clone(),
                )
                .await?,
            ),
            ProvisioningStrategy::ServiceAccount {
                service_account_id,
                key_path,
                ..
            } => Arc::new(ServiceAccountCredentialFactory::new(
                service_account_id.clone(),
                key_path.clone(),
            )),
        };

        self.blob_registry
            .register(GOOGLE_DRIVE_PREFIX, BlobProvider::new(factory, client_id))
            .await?;
        self.activated = true;

        tracing::info!(
            "Registered blob provider '{}' using the {} strategy",
            GOOGLE_DRIVE_PREFIX,
            match strategy {
                ProvisioningStrategy::ServiceAccount { .. } => "service account",
                ProvisioningStrategy::WebApplication { .. } => "web application",
            }
        );
        Ok(())
    }

    /// Unregister the provider under the fixed prefix.
    ///
    /// Idempotent: a missing registration is not an error.
    pub async fn deactivate(&mut self) {
        if !self.blob_registry.unregister(GOOGLE_DRIVE_PREFIX).await {
            tracing::debug!("No blob provider registered under '{}'", GOOGLE_DRIVE_PREFIX);
        }
        self.activated = false;
    }
}
