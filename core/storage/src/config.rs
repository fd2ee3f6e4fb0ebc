//! Host configuration inputs for provisioning.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property naming the service account identity.
pub const SERVICE_ACCOUNT_ID_PROP: &str = "google.serviceAccountId";

/// Property naming the path to the service account private key file.
pub const SERVICE_ACCOUNT_KEY_PATH_PROP: &str = "google.serviceAccountKeyPath";

/// Property naming the public client id for front-end integrations.
pub const CLIENT_ID_PROP: &str = "google.clientId";

/// Declarative provisioning configuration contributed by the host.
///
/// Its presence selects the web application strategy; its absence selects
/// the service account strategy driven by [`HostProperties`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningConfig {
    /// Contact address recorded with the registration.
    #[serde(default)]
    pub email_address: Option<String>,
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
}

/// Environment-style named properties supplied by the host process.
///
/// Injected into the coordinator instead of read from ambient process
/// state so tests and embedders control the values. `from_env` offers the
/// conventional mapping onto process environment variables.
#[derive(Debug, Clone, Default)]
pub struct HostProperties {
    values: HashMap<String, String>,
}

impl HostProperties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the known properties from process environment variables.
    pub fn from_env() -> Self {
        let mut properties = Self::new();
        for (prop, var) in [
            (SERVICE_ACCOUNT_ID_PROP, "GOOGLE_SERVICE_ACCOUNT_ID"),
            (SERVICE_ACCOUNT_KEY_PATH_PROP, "GOOGLE_SERVICE_ACCOUNT_KEY_PATH"),
            (CLIENT_ID_PROP, "GOOGLE_CLIENT_ID"),
        ] {
            if let Ok(value) = std::env::var(var) {
                properties.set(prop, value);
            }
        }
        properties
    }

    /// Set a property value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a property value; blank values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_property_is_absent() {
        let mut properties = HostProperties::new();
        properties.set(SERVICE_ACCOUNT_ID_PROP, "   ");

        assert!(properties.get(SERVICE_ACCOUNT_ID_PROP).is_none());

        properties.set(SERVICE_ACCOUNT_ID_PROP, "svc@x");
        assert_eq!(properties.get(SERVICE_ACCOUNT_ID_PROP), Some("svc@x"));
    }

    #[test]
    fn test_missing_property_is_absent() {
        let properties = HostProperties::new();
        assert!(properties.get(CLIENT_ID_PROP).is_none());
    }

    #[test]
    fn test_config_deserializes_camel_case() {
        let config: ProvisioningConfig = serde_json::from_str(
            r#"{"emailAddress":"admin@example.com","clientId":"abc","clientSecret":"xyz"}"#,
        )
        .unwrap();

        assert_eq!(config.email_address.as_deref(), Some("admin@example.com"));
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.client_secret, "xyz");
    }

    #[test]
    fn test_config_email_address_is_optional() {
        let config: ProvisioningConfig =
            serde_json::from_str(r#"{"clientId":"abc","clientSecret":"xyz"}"#).unwrap();

        assert!(config.email_address.is_none());
    }
}
