//! Web application credential factory.
//!
//! Interactive OAuth2 authorization-code strategy. The client registration
//! lives in the external provider registry and is created exactly once; the
//! per-user tokens seeded through the consent flow are looked up (and
//! refreshed) on every `build`.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use std::sync::Arc;
use url::Url;

use drivelink_common::{Error, Result};

use crate::factory::{Credential, CredentialFactory};
use crate::registry::{
    OAuth2ClientRegistration, OAuth2Provider, OAuth2ProviderRegistry, StoredToken,
};
use crate::{DRIVE_READONLY_SCOPE, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL};

/// Credential factory for web applications.
///
/// Constructed through [`WebApplicationCredentialFactory::initialize`],
/// which guarantees the OAuth2 client registration exists before the
/// factory is handed out. Immutable afterwards.
pub struct WebApplicationCredentialFactory {
    registry: Arc<dyn OAuth2ProviderRegistry>,
    provider_id: String,
    server_base: String,
}

impl WebApplicationCredentialFactory {
    /// Ensure the OAuth2 client registration for `provider_id` exists and
    /// build the factory.
    ///
    /// An existing registration is left untouched: configuration-driven
    /// client id/secret never overwrite persisted values. For a fresh
    /// registration an authorization URL is logged so an operator can seed
    /// the first user token.
    ///
    /// # Errors
    /// - `Error::RegistryUnavailable` if the registry cannot be reached
    /// - `Error::ProviderRegistration` if creating the registration fails
    pub async fn initialize(
        registry: Arc<dyn OAuth2ProviderRegistry>,
        provider_id: impl Into<String>,
        client_id: &str,
        client_secret: &str,
        server_base: impl Into<String>,
    ) -> Result<Self> {
        let provider_id = provider_id.into();
        let server_base = server_base.into();

        match registry.get_provider(&provider_id).await? {
            Some(_) => {
                tracing::warn!(
                    "OAuth2 provider {} is already registered, configured client id/secret won't overwrite it",
                    provider_id
                );
            }
            None => {
                let registration = OAuth2ClientRegistration {
                    provider_id: provider_id.clone(),
                    token_endpoint: GOOGLE_TOKEN_URL.to_string(),
                    authorization_endpoint: GOOGLE_AUTH_URL.to_string(),
                    client_id: client_id.to_string(),
                    client_secret: client_secret.to_string(),
                    scopes: vec![DRIVE_READONLY_SCOPE.to_string()],
                };
                match registry.add_provider(registration).await {
                    Ok(provider) => {
                        match Self::authorization_url(provider.registration(), &server_base) {
                            Ok(url) => tracing::warn!(
                                "Please go to {} to start the authorization flow",
                                url
                            ),
                            Err(e) => {
                                tracing::warn!("Could not build authorization URL: {}", e);
                            }
                        }
                    }
                    // Lost the check-then-act race against another
                    // activation; the registry's uniqueness constraint
                    // held and the winner's registration is used.
                    Err(Error::AlreadyExists(_)) => {
                        tracing::warn!(
                            "OAuth2 provider {} was registered concurrently, using the existing registration",
                            provider_id
                        );
                    }
                    Err(e @ (Error::RegistryUnavailable(_) | Error::ProviderRegistration(_))) => {
                        return Err(e)
                    }
                    Err(e) => return Err(Error::ProviderRegistration(e.to_string())),
                }
            }
        }

        Ok(Self {
            registry,
            provider_id,
            server_base,
        })
    }

    /// Provider id this factory resolves registrations and tokens under.
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Build the one-time authorization URL an administrator can visit to
    /// seed the first user token.
    pub fn authorization_url(
        registration: &OAuth2ClientRegistration,
        server_base: &str,
    ) -> Result<String> {
        let redirect = callback_url(registration, server_base)?;
        let client = oauth_client(registration)?.set_redirect_uri(
            RedirectUrl::new(redirect)
                .map_err(|e| Error::Configuration(format!("Invalid redirect URL: {}", e)))?,
        );

        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in &registration.scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }
        // Offline access plus a forced consent screen so a refresh token
        // is issued even for repeat authorizations.
        let (url, _csrf) = request
            .add_extra_param("access_type", "offline")
            .add_extra_param("approval_prompt", "force")
            .url();

        Ok(url.to_string())
    }

    /// Exchange an authorization code delivered to the provider's callback
    /// route and persist the resulting token for `user`.
    ///
    /// # Errors
    /// - Registration missing from the registry
    /// - Code rejected by the token endpoint
    pub async fn exchange_code(&self, user: &str, code: &str) -> Result<Credential> {
        let provider = self
            .registry
            .get_provider(&self.provider_id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "OAuth2 provider {} is not registered",
                    self.provider_id
                ))
            })?;

        let registration = provider.registration();
        let redirect = callback_url(registration, &self.server_base)?;
        let client = oauth_client(registration)?.set_redirect_uri(
            RedirectUrl::new(redirect)
                .map_err(|e| Error::Configuration(format!("Invalid redirect URL: {}", e)))?,
        );

        let response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                Error::CredentialBuild(format!("Code exchange for user {} failed: {}", user, e))
            })?;

        let token = stored_token(user, &response, None);
        provider.store_credential(token.clone()).await.map_err(|e| {
            Error::CredentialBuild(format!("Persisting token for user {} failed: {}", user, e))
        })?;

        Ok(token.into_credential())
    }

    async fn refresh(
        &self,
        provider: &dyn OAuth2Provider,
        user: &str,
        refresh_token: &str,
    ) -> Result<Credential> {
        let client = oauth_client(provider.registration())
            .map_err(|e| Error::CredentialBuild(e.to_string()))?;

        let response = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                Error::CredentialBuild(format!("Token refresh for user {} failed: {}", user, e))
            })?;

        let token = stored_token(user, &response, Some(refresh_token));
        provider.store_credential(token.clone()).await.map_err(|e| {
            Error::CredentialBuild(format!(
                "Persisting refreshed token for user {} failed: {}",
                user, e
            ))
        })?;

        Ok(token.into_credential())
    }
}

#[async_trait]
impl CredentialFactory for WebApplicationCredentialFactory {
    async fn build(&self, user: &str) -> Result<Option<Credential>> {
        let Some(provider) = self.registry.get_provider(&self.provider_id).await? else {
            return Ok(None);
        };

        let token = provider.load_credential(user).await.map_err(|e| {
            Error::CredentialBuild(format!("Token lookup for user {} failed: {}", user, e))
        })?;
        let Some(token) = token else {
            return Ok(None);
        };

        if token.is_expired() {
            if let Some(refresh_token) = token.refresh_token.as_deref() {
                let refreshed = self.refresh(provider.as_ref(), user, refresh_token).await?;
                return Ok(Some(refreshed));
            }
            tracing::debug!(
                "Stored token for user {} is expired and has no refresh token",
                user
            );
        }

        Ok(Some(token.into_credential()))
    }
}

/// OAuth2 client for the stored registration's endpoints.
fn oauth_client(registration: &OAuth2ClientRegistration) -> Result<BasicClient> {
    Ok(BasicClient::new(
        ClientId::new(registration.client_id.clone()),
        Some(ClientSecret::new(registration.client_secret.clone())),
        AuthUrl::new(registration.authorization_endpoint.clone()).map_err(|e| {
            Error::Configuration(format!(
                "Invalid authorization endpoint {}: {}",
                registration.authorization_endpoint, e
            ))
        })?,
        Some(
            TokenUrl::new(registration.token_endpoint.clone()).map_err(|e| {
                Error::Configuration(format!(
                    "Invalid token endpoint {}: {}",
                    registration.token_endpoint, e
                ))
            })?,
        ),
    ))
}

/// Callback route for the provider under the host's server base URL.
fn callback_url(registration: &OAuth2ClientRegistration, server_base: &str) -> Result<String> {
    let base = Url::parse(server_base).map_err(|e| {
        Error::Configuration(format!("Invalid server base URL {}: {}", server_base, e))
    })?;
    Ok(format!(
        "{}/oauth2/{}/callback",
        base.as_str().trim_end_matches('/'),
        registration.provider_id
    ))
}

fn stored_token(
    user: &str,
    response: &BasicTokenResponse,
    fallback_refresh: Option<&str>,
) -> StoredToken {
    // A refresh response may omit the refresh token; keep the old one.
    let refresh_token = response
        .refresh_token()
        .map(|t| t.secret().clone())
        .or_else(|| fallback_refresh.map(str::to_string));

    let expires_at = response
        .expires_in()
        .and_then(|d| Duration::from_std(d).ok())
        .map(|d| Utc::now() + d);

    StoredToken {
        user_id: user.to_string(),
        access_token: response.access_token().secret().clone(),
        refresh_token,
        expires_at,
    }
}
