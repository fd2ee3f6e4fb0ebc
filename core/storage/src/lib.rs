//! Blob provider registration for Drivelink.
//!
//! This module owns the prefix-keyed blob provider registry and the
//! provisioning lifecycle: at activation exactly one provisioning strategy
//! is selected from the host configuration, the matching credential
//! factory is built, and a blob provider bound to it is registered under
//! the fixed prefix. Blob CRUD against the remote API stays with the host
//! blob manager, not this module.

pub mod component;
pub mod config;
pub mod provider;
pub mod registry;

pub use component::{
    ProvisioningCoordinator, ProvisioningStrategy, GOOGLE_DRIVE_OAUTH_PROVIDER_ID,
    GOOGLE_DRIVE_PREFIX,
};
pub use config::{
    HostProperties, ProvisioningConfig, CLIENT_ID_PROP, SERVICE_ACCOUNT_ID_PROP,
    SERVICE_ACCOUNT_KEY_PATH_PROP,
};
pub use provider::BlobProvider;
pub use registry::BlobProviderRegistry;
