use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose;
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl};
use reqwest::{ClientBuilder, header, redirect};
use serde::{Deserialize, Serialize};
use social_core::config::DriverConfig;
use social_core::driver::{ApiRequestHook, AuthorizationDetails, DriverRegistry, OAuthError, SocialDriver};
use social_core::profile::{AccessToken, CallbackQuery, EmailVerificationState, NormalizedProfile, UserWithToken};

const AUTHORIZE_URL: &str = "https://api.notion.com/v1/oauth/authorize";
const ACCESS_TOKEN_URL: &str = "https://api.notion.com/v1/oauth/token";
const USER_INFO_URL: &str = "https://api.notion.com/v1/users/me";

// Notion serves a different, possibly incompatible, API revision to
// unversioned calls, so every request pins this one.
const NOTION_VERSION: &str = "2022-02-22";

/// Callback `error` value Notion sends when the user cancels the consent
/// screen.
const ERROR_ACCESS_DENIED: &str = "access_denied";

/// Cookie name hosts conventionally use when persisting the CSRF state for
/// this driver.
pub const STATE_COOKIE_NAME: &str = "notion_oauth_state";

/// Installs the Notion driver factory under the `"notion"` key.
pub fn register(registry: &mut DriverRegistry) {
    registry.register("notion", |config| Ok(Arc::new(NotionDriver::new(config)?)));
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    grant_type: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

// Notion wraps the token owner as a bot-integration record; the profile of
// interest lives at `bot.owner.user`. `person` is absent when the owner is a
// workspace bot rather than a person, which leaves the email unknown.
#[derive(Debug, Deserialize)]
struct UserInfoEnvelope {
    bot: BotRecord,
}

#[derive(Debug, Deserialize)]
struct BotRecord {
    owner: BotOwner,
}

#[derive(Debug, Deserialize)]
struct BotOwner {
    user: OwnerUser,
}

#[derive(Debug, Deserialize)]
struct OwnerUser {
    id: String,
    name: String,
    avatar_url: Option<String>,
    person: Option<PersonRecord>,
}

#[derive(Debug, Deserialize)]
struct PersonRecord {
    email: Option<String>,
}

/// Driver for Notion's authorization-code flow.
///
/// Mostly configuration driven except the user-info normalization; endpoint
/// URLs fall back to Notion's hosted defaults unless overridden.
#[derive(Debug)]
pub struct NotionDriver {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    redirect_url: RedirectUrl,
    access_token_url: String,
    user_info_url: String,
    stateless: bool,
}

impl NotionDriver {
    pub fn new(config: DriverConfig) -> Result<Self, OAuthError> {
        Ok(Self {
            client_id: ClientId::new(config.client_id),
            client_secret: ClientSecret::new(config.client_secret),
            auth_url: AuthUrl::new(config.authorize_url.unwrap_or_else(|| AUTHORIZE_URL.to_string()))?,
            redirect_url: RedirectUrl::new(config.callback_url)?,
            access_token_url: config.access_token_url.unwrap_or_else(|| ACCESS_TOKEN_URL.to_string()),
            user_info_url: config.user_info_url.unwrap_or_else(|| USER_INFO_URL.to_string()),
            stateless: config.stateless,
        })
    }

    fn basic_credentials(&self) -> String {
        general_purpose::STANDARD.encode(format!("{}:{}", self.client_id.as_str(), self.client_secret.secret()))
    }

    /// Bearer GET with the accept and version headers Notion requires on
    /// every API call.
    fn authenticated_request(&self, url: &str, access_token: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .get(url)
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/json")
            .header("Notion-Version", NOTION_VERSION)
    }
}

#[async_trait::async_trait]
impl SocialDriver for NotionDriver {
    fn get_authorization_details(&self) -> AuthorizationDetails {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        // Notion has no OAuth scopes, so the request carries only `owner=user`
        // beyond the standard parameters.
        let (mut url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_extra_param("owner", "user")
            .url();

        if self.stateless {
            let params: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| key.as_ref() != "state")
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect();
            url.query_pairs_mut().clear().extend_pairs(params);

            return AuthorizationDetails { url: url.to_string(), csrf_token: None };
        }

        AuthorizationDetails { url: url.to_string(), csrf_token: Some(csrf_token) }
    }

    fn access_denied(&self, query: &CallbackQuery) -> bool {
        query.error.as_deref() == Some(ERROR_ACCESS_DENIED)
    }

    async fn exchange_code(&self, code: String) -> Result<AccessToken, OAuthError> {
        let http_client = ClientBuilder::new().redirect(redirect::Policy::none()).build()?;

        // Notion wants the client credentials Basic-encoded in the
        // Authorization header and rejects them in the JSON body.
        let body = TokenExchangeRequest {
            grant_type: "authorization_code",
            code: &code,
            redirect_uri: self.redirect_url.as_str(),
        };

        let response = http_client
            .post(&self.access_token_url)
            .header(header::AUTHORIZATION, format!("Basic {}", self.basic_credentials()))
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!("Notion token exchange failed: {error_body}");
            return Err(OAuthError::TokenExchange(error_body));
        }

        let token: TokenExchangeResponse = response.json().await?;

        Ok(AccessToken::bearer(token.access_token))
    }

    async fn get_user_info(
        &self,
        access_token: &str,
        hook: Option<Arc<ApiRequestHook>>,
    ) -> Result<NormalizedProfile, OAuthError> {
        let mut request = self.authenticated_request(&self.user_info_url, access_token);
        if let Some(hook) = hook {
            request = hook(request);
        }

        let body: serde_json::Value = request.send().await?.error_for_status()?.json().await?;

        let envelope: UserInfoEnvelope = serde_json::from_value(body.clone()).map_err(|err| {
            tracing::error!("Unexpected Notion user info envelope: {err}");
            OAuthError::ProfileParse
        })?;

        let user = envelope.bot.owner.user;

        Ok(NormalizedProfile {
            id: user.id,
            // Notion exposes a single display name field, so nickname and
            // display name are identical.
            nick_name: user.name.clone(),
            name: user.name,
            email: user.person.and_then(|person| person.email),
            avatar_url: user.avatar_url,
            email_verification_state: EmailVerificationState::Unsupported,
            original: body,
        })
    }

    async fn user(&self, code: String, hook: Option<Arc<ApiRequestHook>>) -> Result<UserWithToken, OAuthError> {
        let token = self.exchange_code(code).await?;
        let profile = self.get_user_info(&token.token, hook).await?;

        Ok(UserWithToken { profile, token })
    }

    async fn user_from_token(
        &self,
        token: String,
        hook: Option<Arc<ApiRequestHook>>,
    ) -> Result<UserWithToken, OAuthError> {
        let profile = self.get_user_info(&token, hook).await?;

        Ok(UserWithToken { profile, token: AccessToken::bearer(token) })
    }
}
