//! Discord OAuth provider.

use async_trait::async_trait;
use log::*;
use secrecy::ExposeSecret;
use serde::Serialize;

use super::{network_error, read_token_response, StandardTokenResponse};
use crate::error::Error;
use crate::http::ConnectorClient;
use crate::oauth::{ClientCredentials, ProviderKind, Tokens};

pub const DEFAULT_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
    code: &'a str,
    redirect_uri: &'a str,
}

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
        ProviderKind::Discord
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Tokens, Error> {
        let request = TokenExchangeRequest {
            client_id: &self.credentials.client_id,
            client_secret: self.credentials.client_secret.expose_secret(),
            grant_type: "authorization_code",
            code,
            redirect_uri,
        };

        debug!("Exchanging Discord OAuth code for tokens");

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| network_error("Discord", e))?;

        let body: StandardTokenResponse = read_token_response("Discord", response).await?;
        info!("Successfully exchanged Discord OAuth code for tokens");

        Ok(Tokens::new(body.access_token, body.token_type)
            .with_refresh_token(body.refresh_token)
            .with_expires_in(body.expires_in)
            .with_scopes(body.scope.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, OAuthErrorKind};
    use crate::http::ConnectorClientBuilder;
    use crate::oauth::Provider as _;
    use mockito::Matcher;

    fn provider(server: &mockito::Server) -> Provider {
        Provider::new(
            ClientCredentials::new("discord-id".to_string(), "discord-secret".to_string()),
            format!("{}/api/oauth2/token", server.url()),
            ConnectorClientBuilder::new().build().unwrap(),
        )
    }

    #[tokio::test]
    async fn exchanges_code_with_form_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/oauth2/token")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "d-code".into()),
                Matcher::UrlEncoded("client_id".into(), "discord-id".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"access_token":"d-access","token_type":"Bearer","expires_in":604800,
                    "refresh_token":"d-refresh","scope":"identify bot"}"#,
            )
            .create_async()
            .await;

        let tokens = provider(&server)
            .exchange_code("d-code", "http://app/integrations/callback")
            .await
            .unwrap();

        assert_eq!(tokens.access_token.expose_secret(), "d-access");
        assert_eq!(tokens.scopes, vec!["identify", "bot"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejection_carries_discord_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/oauth2/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;

        let err = provider(&server).exchange_code("c", "r").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
        assert_eq!(err.message().as_deref(), Some("invalid_client"));
    }
}
