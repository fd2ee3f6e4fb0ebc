//! Credential provisioning for the Google Drive blob provider.
//!
//! This module decides how requests to the Drive API are authenticated and
//! produces live credentials on demand:
//! - Service account: non-interactive, signs a grant assertion with a
//!   private key, no per-user consent.
//! - Web application: interactive OAuth2 authorization-code flow backed by
//!   a durable provider registry holding the client registration and the
//!   per-user tokens.
//!
//! # Design Principles
//! - Factories are immutable after construction and safe for concurrent use
//! - Mutable state (registrations, user tokens) lives in the external
//!   OAuth2 provider registry, never in a factory
//! - A missing stored token is `Ok(None)`, never an error

pub mod factory;
pub mod memory;
pub mod registry;
pub mod service_account;
pub mod web_application;

pub use factory::{Credential, CredentialFactory};
pub use memory::MemoryProviderRegistry;
pub use registry::{OAuth2ClientRegistration, OAuth2Provider, OAuth2ProviderRegistry, StoredToken};
pub use service_account::ServiceAccountCredentialFactory;
pub use web_application::WebApplicationCredentialFactory;

/// OAuth2 token endpoint for Google APIs.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 authorization endpoint for Google APIs.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Read-only scope for the Drive API.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
