//! Construction-time provider configuration.

use serde::Deserialize;

use crate::driver::OAuthError;

/// Credentials and endpoints for one provider, immutable after build.
///
/// The endpoint overrides are optional; a driver falls back to its hardcoded
/// provider defaults when they are absent. `stateless` skips CSRF state on
/// the redirect, trading CSRF protection for statelessness.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    #[serde(default)]
    pub authorize_url: Option<String>,
    #[serde(default)]
    pub access_token_url: Option<String>,
    #[serde(default)]
    pub user_info_url: Option<String>,
    #[serde(default)]
    pub stateless: bool,
}

impl DriverConfig {
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> DriverConfigBuilder {
        DriverConfigBuilder {
            inner: DriverConfig {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                callback_url: callback_url.into(),
                authorize_url: None,
                access_token_url: None,
                user_info_url: None,
                stateless: false,
            },
        }
    }

    /// Reads the `oauth.<provider>` section of an application configuration,
    /// e.g. `oauth.notion.client_id`.
    pub fn from_config(config: &config::Config, provider: &str) -> Result<Self, OAuthError> {
        Ok(config.get::<Self>(&format!("oauth.{provider}"))?)
    }
}

pub struct DriverConfigBuilder {
    inner: DriverConfig,
}

impl DriverConfigBuilder {
    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.inner.authorize_url = Some(url.into());
        self
    }

    pub fn access_token_url(mut self, url: impl Into<String>) -> Self {
        self.inner.access_token_url = Some(url.into());
        self
    }

    pub fn user_info_url(mut self, url: impl Into<String>) -> Self {
        self.inner.user_info_url = Some(url.into());
        self
    }

    pub fn stateless(mut self) -> Self {
        self.inner.stateless = true;
        self
    }

    pub fn build(self) -> DriverConfig {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    /// Helper function to create a temporary config file with YAML content
    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("Failed to create temp file");

        temp_file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        temp_file.flush().expect("Failed to flush temp file");
        temp_file
    }

    #[test]
    fn test_builder_defaults() {
        let config = DriverConfig::builder("client_id", "client_secret", "https://example.com/callback").build();

        assert_eq!(config.client_id, "client_id");
        assert_eq!(config.client_secret, "client_secret");
        assert_eq!(config.callback_url, "https://example.com/callback");
        assert!(config.authorize_url.is_none());
        assert!(config.access_token_url.is_none());
        assert!(config.user_info_url.is_none());
        assert!(!config.stateless);
    }

    #[test]
    fn test_builder_overrides() {
        let config = DriverConfig::builder("client_id", "client_secret", "https://example.com/callback")
            .authorize_url("https://auth.example.com/authorize")
            .access_token_url("https://auth.example.com/token")
            .user_info_url("https://api.example.com/me")
            .stateless()
            .build();

        assert_eq!(config.authorize_url.as_deref(), Some("https://auth.example.com/authorize"));
        assert_eq!(config.access_token_url.as_deref(), Some("https://auth.example.com/token"));
        assert_eq!(config.user_info_url.as_deref(), Some("https://api.example.com/me"));
        assert!(config.stateless);
    }

    #[test]
    fn test_from_config() {
        let config_content = r#"
            oauth:
                notion:
                    client_id: "client_id"
                    client_secret: "client_secret"
                    callback_url: "https://example.com/callback"
        "#;

        let temp_file = create_temp_config(config_content);
        let raw = config::Config::builder()
            .add_source(config::File::from(temp_file.path()))
            .build()
            .expect("Failed to build config");

        let config = DriverConfig::from_config(&raw, "notion").expect("Failed to read driver config");

        assert_eq!(config.client_id, "client_id");
        assert_eq!(config.client_secret, "client_secret");
        assert_eq!(config.callback_url, "https://example.com/callback");
        assert!(config.authorize_url.is_none());
        assert!(!config.stateless);
    }

    #[test]
    fn test_from_config_with_overrides() {
        let config_content = r#"
            oauth:
                notion:
                    client_id: "client_id"
                    client_secret: "client_secret"
                    callback_url: "https://example.com/callback"
                    access_token_url: "http://localhost:9000/oauth/token"
                    user_info_url: "http://localhost:9000/users/me"
                    stateless: true
        "#;

        let temp_file = create_temp_config(config_content);
        let raw = config::Config::builder()
            .add_source(config::File::from(temp_file.path()))
            .build()
            .expect("Failed to build config");

        let config = DriverConfig::from_config(&raw, "notion").expect("Failed to read driver config");

        assert_eq!(config.access_token_url.as_deref(), Some("http://localhost:9000/oauth/token"));
        assert_eq!(config.user_info_url.as_deref(), Some("http://localhost:9000/users/me"));
        assert!(config.stateless);
    }

    #[test]
    fn test_from_config_missing_provider() {
        let config_content = r#"
            oauth:
                google:
                    client_id: "client_id"
        "#;

        let temp_file = create_temp_config(config_content);
        let raw = config::Config::builder()
            .add_source(config::File::from(temp_file.path()))
            .build()
            .expect("Failed to build config");

        let result = DriverConfig::from_config(&raw, "notion");

        assert!(matches!(result.unwrap_err(), OAuthError::Config(_)));
    }
}
