//! Tokens returned by a provider's authorization-code exchange.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;

/// OAuth tokens with metadata.
///
/// Fields mirror what the provider returned; mapping them onto integration
/// credentials is up to the caller.
#[derive(Debug, Clone)]
pub struct Tokens {
    /// Primary access token. For Slack v2 this is the bot token.
    pub access_token: SecretString,
    /// Refresh token for obtaining new access tokens.
    pub refresh_token: Option<SecretString>,
    /// User-scoped token returned next to a bot token (Slack `authed_user`).
    pub user_access_token: Option<SecretString>,
    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Token type (usually "Bearer", "bot" for Slack).
    pub token_type: String,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// Workspace the grant belongs to (Slack team, Notion workspace).
    pub workspace_id: Option<String>,
    /// Channel chosen during consent, when the provider reports one.
    pub channel_id: Option<String>,
}

impl Tokens {
    pub fn new(access_token: String, token_type: Option<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token),
            refresh_token: None,
            user_access_token: None,
            expires_at: None,
            token_type: token_type.unwrap_or_else(|| "Bearer".to_string()),
            scopes: Vec::new(),
            workspace_id: None,
            channel_id: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token.map(SecretString::from);
        self
    }

    pub fn with_expires_in(mut self, expires_in: Option<i64>) -> Self {
        self.expires_at = expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
        self
    }

    /// Accepts scopes separated by spaces (RFC 6749) or commas (Slack).
    pub fn with_scopes(mut self, scope: Option<&str>) -> Self {
        self.scopes = scope
            .unwrap_or_default()
            .split([' ', ','])
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_to_bearer() {
        let tokens = Tokens::new("abc".to_string(), None);
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.access_token.expose_secret(), "abc");
        assert!(tokens.refresh_token.is_none());
    }

    #[test]
    fn scopes_split_on_spaces_and_commas() {
        let tokens = Tokens::new("abc".to_string(), None)
            .with_scopes(Some("chat:write,channels:read groups:read"));
        assert_eq!(tokens.scopes, vec!["chat:write", "channels:read", "groups:read"]);
    }

    #[test]
    fn expires_in_sets_expiry() {
        let tokens = Tokens::new("abc".to_string(), None).with_expires_in(Some(3600));
        let remaining = tokens.expires_at.unwrap() - Utc::now();
        assert!(remaining > Duration::minutes(59));
        assert!(remaining <= Duration::hours(1));
    }
}
