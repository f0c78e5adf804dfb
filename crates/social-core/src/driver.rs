//! The driver seam: capability trait, error taxonomy, and the host-facing
//! driver registry for OAuth 2.0 social login providers.

use std::collections::HashMap;
use std::sync::Arc;

use oauth2::CsrfToken;
use thiserror::Error;

use crate::config::DriverConfig;
use crate::profile::{AccessToken, CallbackQuery, NormalizedProfile, UserWithToken};

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("OAuth token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Failed to parse user profile response")]
    ProfileParse,

    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    #[error("Configuration getter failed")]
    Config(#[from] config::ConfigError),
}

/// Everything the host must persist to complete an authorization redirect.
///
/// `csrf_token` is `None` for stateless flows, which skip state verification
/// entirely; otherwise the host stores the secret (typically in a cookie) and
/// compares it against the callback `state` parameter.
#[derive(Debug)]
pub struct AuthorizationDetails {
    pub url: String,
    pub csrf_token: Option<CsrfToken>,
}

/// Lets callers inspect or extend an outbound profile request before it is
/// sent, e.g. to add correlation headers.
pub type ApiRequestHook = dyn Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder + Send + Sync;

/// A trait defining the contract for one provider's authorization-code flow.
///
/// Implementations are constructed per inbound request from a
/// [`DriverConfig`] and hold no mutable state; the only suspension points are
/// the two outbound HTTP calls, awaited sequentially.
#[async_trait::async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SocialDriver: std::fmt::Debug + Send + Sync {
    /// Builds the authorization redirect URL and the state the host must keep.
    fn get_authorization_details(&self) -> AuthorizationDetails;

    /// Returns true when the callback reports a user-denied authorization.
    fn access_denied(&self, query: &CallbackQuery) -> bool;

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: String) -> Result<AccessToken, OAuthError>;

    /// Fetches the user's profile from the provider and normalizes it.
    async fn get_user_info(
        &self,
        access_token: &str,
        hook: Option<Arc<ApiRequestHook>>,
    ) -> Result<NormalizedProfile, OAuthError>;

    /// Runs the full post-callback flow: code exchange, then profile fetch.
    async fn user(&self, code: String, hook: Option<Arc<ApiRequestHook>>) -> Result<UserWithToken, OAuthError>;

    /// Looks the user up with a token obtained from an earlier flow. No
    /// exchange is performed and the token is not validated beyond the
    /// profile call itself succeeding.
    async fn user_from_token(
        &self,
        token: String,
        hook: Option<Arc<ApiRequestHook>>,
    ) -> Result<UserWithToken, OAuthError>;
}

/// Constructor function for one provider's driver, invoked per request.
pub type DriverFactory = Box<dyn Fn(DriverConfig) -> Result<Arc<dyn SocialDriver>, OAuthError> + Send + Sync>;

/// Lookup table of driver factories keyed by provider name.
#[derive(Default)]
pub struct DriverRegistry {
    factories: HashMap<String, DriverFactory>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(DriverConfig) -> Result<Arc<dyn SocialDriver>, OAuthError> + Send + Sync + 'static,
    {
        tracing::debug!("Registering social login driver: {name}");
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Constructs a fresh driver for the named provider.
    pub fn create(&self, name: &str, config: DriverConfig) -> Result<Arc<dyn SocialDriver>, OAuthError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| OAuthError::DriverNotFound(name.to_string()))?;

        factory(config)
    }

    pub fn has_driver(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
