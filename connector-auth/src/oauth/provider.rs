//! OAuth provider trait and types.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::Tokens;
use crate::error::{oauth_error, Error, OAuthErrorKind};

/// OAuth providers with a real code exchange.
///
/// Google Drive and Google Analytics share one Google exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Slack,
    Google,
    Notion,
    Discord,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Slack => "slack",
            ProviderKind::Google => "google",
            ProviderKind::Notion => "notion",
            ProviderKind::Discord => "discord",
        }
    }
}

/// Server-held OAuth client registration.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl ClientCredentials {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret: SecretString::from(client_secret),
        }
    }
}

/// Trait for OAuth 2.0 providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Exchange an authorization code for tokens.
    ///
    /// Issues exactly one request to the provider's token endpoint. A
    /// rejection carries the provider's error string verbatim.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Tokens, Error>;
}

/// Build an authorize URL for the authorization-code flow.
///
/// Scopes are joined with a single space.
pub fn authorization_url(
    endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
) -> Result<String, Error> {
    let scope = scopes.join(" ");
    let url = url::Url::parse_with_params(
        endpoint,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("state", state),
            ("response_type", "code"),
        ],
    )
    .map_err(|e| oauth_error(OAuthErrorKind::InvalidAuthorizeUrl, &e.to_string()))?;

    Ok(url.into())
}
