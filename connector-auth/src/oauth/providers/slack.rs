//! Slack OAuth v2 provider (`oauth.v2.access`).

use async_trait::async_trait;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{network_error, read_token_response};
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::http::ConnectorClient;
use crate::oauth::{ClientCredentials, ProviderKind, Tokens};

pub const DEFAULT_TOKEN_URL: &str = "https://slack.com/api/oauth.v2.access";

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

/// Slack answers 200 for logical failures and signals them with `ok:false`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    ok: bool,
    error: Option<String>,
    access_token: Option<String>,
    token_type: Option<String>,
    scope: Option<String>,
    team: Option<Team>,
    authed_user: Option<AuthedUser>,
    incoming_webhook: Option<IncomingWebhook>,
}

#[derive(Debug, Deserialize)]
struct Team {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthedUser {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IncomingWebhook {
    channel_id: Option<String>,
}

/// Slack OAuth provider.
///
/// The primary token in the result is the bot token; the installing user's
/// token, team and webhook channel are carried alongside it.
pub struct Provider {
    credentials: ClientCredentials,
    token_url: String,
    http_client: ConnectorClient,
}

impl Provider {
    pub fn new(credentials: ClientCredentials, token_url: String, http_client: ConnectorClient) -> Self {
        Self {
            credentials,
            token_url,
            http_client,
        }
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Slack
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Tokens, Error> {
        let request = TokenExchangeRequest {
            code,
            client_id: &self.credentials.client_id,
            client_secret: self.credentials.client_secret.expose_secret(),
            redirect_uri,
        };

        debug!("Exchanging Slack OAuth code for tokens");

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| network_error("Slack", e))?;

        let body: TokenResponse = read_token_response("Slack", response).await?;
        if !body.ok {
            let error = body.error.unwrap_or_else(|| "unknown_error".to_string());
            warn!("Slack token exchange failed: {error}");
            return Err(oauth_error(OAuthErrorKind::TokenExchangeFailed, &error));
        }

        let access_token = body.access_token.ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::InvalidResponse,
                "Slack response is missing access_token",
            )
        })?;

        info!("Successfully exchanged Slack OAuth code for tokens");

        let mut tokens = Tokens::new(access_token, body.token_type).with_scopes(body.scope.as_deref());
        tokens.user_access_token = body
            .authed_user
            .and_then(|user| user.access_token)
            .map(SecretString::from);
        tokens.workspace_id = body.team.and_then(|team| team.id);
        tokens.channel_id = body.incoming_webhook.and_then(|hook| hook.channel_id);
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::ConnectorClientBuilder;
    use crate::oauth::Provider as _;
    use mockito::Matcher;

    fn provider(server: &mockito::Server) -> Provider {
        Provider::new(
            ClientCredentials::new("client-id".to_string(), "client-secret".to_string()),
            format!("{}/oauth.v2.access", server.url()),
            ConnectorClientBuilder::new().build().unwrap(),
        )
    }

    #[tokio::test]
    async fn maps_bot_user_team_and_channel() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth.v2.access")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "the-code".into()),
                Matcher::UrlEncoded("client_id".into(), "client-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "http://app/integrations/callback".into()),
            ]))
            .with_status(200)
            .with_body(
                r##"{
                    "ok": true,
                    "access_token": "xoxb-bot",
                    "token_type": "bot",
                    "scope": "chat:write,channels:read",
                    "team": {"id": "T123", "name": "Acme"},
                    "authed_user": {"id": "U1", "access_token": "xoxp-user"},
                    "incoming_webhook": {"channel": "#general", "channel_id": "C42"}
                }"##,
            )
            .create_async()
            .await;

        let tokens = provider(&server)
            .exchange_code("the-code", "http://app/integrations/callback")
            .await
            .unwrap();

        assert_eq!(tokens.access_token.expose_secret(), "xoxb-bot");
        assert_eq!(tokens.token_type, "bot");
        assert_eq!(
            tokens.user_access_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("xoxp-user")
        );
        assert_eq!(tokens.workspace_id.as_deref(), Some("T123"));
        assert_eq!(tokens.channel_id.as_deref(), Some("C42"));
        assert_eq!(tokens.scopes, vec!["chat:write", "channels:read"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ok_false_carries_slack_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth.v2.access")
            .with_status(200)
            .with_body(r#"{"ok": false, "error": "invalid_code"}"#)
            .create_async()
            .await;

        let err = provider(&server)
            .exchange_code("bad", "http://app/integrations/callback")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
        assert_eq!(err.message().as_deref(), Some("invalid_code"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let provider = Provider::new(
            ClientCredentials::new("id".to_string(), "secret".to_string()),
            "http://127.0.0.1:1/oauth.v2.access".to_string(),
            ConnectorClientBuilder::new().build().unwrap(),
        );

        let err = provider.exchange_code("c", "r").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::Network));
    }
}
