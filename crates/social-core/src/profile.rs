//! Shared data model for social login drivers.

use serde::{Deserialize, Serialize};

/// Scheme under which an access token is presented to the provider API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Bearer,
}

/// Opaque credential returned by (or supplied to) a driver.
///
/// No expiry or refresh token is tracked; providers that issue neither in the
/// authorization-code flow leave nothing to track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl AccessToken {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self { token: token.into(), token_type: TokenType::Bearer }
    }
}

/// Whether the provider vouches for the profile email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailVerificationState {
    Verified,
    Unverified,
    Unsupported,
}

/// A provider user profile mapped into a provider-independent shape.
///
/// Produced fresh on every profile fetch; never cached or persisted here.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedProfile {
    /// The unique identifier for the user within the provider's system.
    pub id: String,
    /// Short display handle. Providers exposing a single name field report
    /// the same value here and in `name`.
    pub nick_name: String,
    /// The user's display name.
    pub name: String,
    /// Primary email address, when the provider exposes one for this account.
    pub email: Option<String>,
    /// Profile avatar URL, if available.
    pub avatar_url: Option<String>,
    pub email_verification_state: EmailVerificationState,
    /// The raw provider response body, preserved for callers that need
    /// provider-specific fields the normalized shape drops.
    pub original: serde_json::Value,
}

/// Final artifact of a completed flow: the profile paired with its token.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithToken {
    #[serde(flatten)]
    pub profile: NormalizedProfile,
    pub token: AccessToken,
}

/// Query parameters of the inbound provider callback, as parsed by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn profile_fixture() -> NormalizedProfile {
        NormalizedProfile {
            id: "u1".to_string(),
            nick_name: "Ada".to_string(),
            name: "Ada".to_string(),
            email: Some("a@x.com".to_string()),
            avatar_url: None,
            email_verification_state: EmailVerificationState::Unsupported,
            original: json!({"raw": true}),
        }
    }

    #[test]
    fn test_access_token_serializes_bearer_type() {
        let token = AccessToken::bearer("tok123");

        let value = serde_json::to_value(&token).unwrap();

        assert_eq!(value, json!({"token": "tok123", "type": "bearer"}));
    }

    #[test]
    fn test_access_token_round_trips() {
        let token: AccessToken = serde_json::from_value(json!({"token": "tok123", "type": "bearer"})).unwrap();

        assert_eq!(token.token, "tok123");
        assert_eq!(token.token_type, TokenType::Bearer);
    }

    #[test]
    fn test_email_verification_state_serializes_lowercase() {
        let value = serde_json::to_value(EmailVerificationState::Unsupported).unwrap();

        assert_eq!(value, json!("unsupported"));
    }

    #[test]
    fn test_user_with_token_flattens_profile() {
        let user = UserWithToken { profile: profile_fixture(), token: AccessToken::bearer("tok123") };

        let value = serde_json::to_value(&user).unwrap();

        // Profile fields sit at the top level next to the token object.
        assert_eq!(value["id"], "u1");
        assert_eq!(value["nick_name"], "Ada");
        assert_eq!(value["email_verification_state"], "unsupported");
        assert_eq!(value["original"], json!({"raw": true}));
        assert_eq!(value["token"], json!({"token": "tok123", "type": "bearer"}));
    }

    #[test]
    fn test_callback_query_defaults_missing_parameters() {
        let query: CallbackQuery = serde_json::from_value(json!({"code": "abc"})).unwrap();

        assert_eq!(query.code.as_deref(), Some("abc"));
        assert!(query.state.is_none());
        assert!(query.error.is_none());
    }
}
