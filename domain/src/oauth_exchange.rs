//! Authorization-code exchange with server-held client secrets.
//!
//! Picks the provider's token endpoint, performs exactly one exchange and maps
//! the returned tokens onto that provider's [`Credentials`]. Nothing is
//! persisted here.

use connector_auth::http::ConnectorClient;
use connector_auth::oauth::providers::{discord, google, notion, slack};
use connector_auth::oauth::{ClientCredentials, Provider as OAuthProvider, Tokens};
use log::*;
use secrecy::ExposeSecret;
use service::config::Config;

use crate::credentials::{
    Credentials, DiscordCredentials, GoogleCredentials, NotionCredentials, SlackCredentials,
    ZapierCredentials,
};
use crate::error::Error;
use crate::provider::Provider;
use crate::registry::non_empty;

/// Token endpoints, resolved once from configuration.
#[derive(Debug, Clone)]
struct TokenUrls {
    slack: String,
    google: String,
    notion: String,
    discord: String,
}

impl TokenUrls {
    fn from_config(config: &Config) -> Self {
        Self {
            slack: format!(
                "{}/oauth.v2.access",
                config.slack_api_url().trim_end_matches('/')
            ),
            google: config.google_token_url().to_string(),
            notion: format!(
                "{}/oauth/token",
                config.notion_api_url().trim_end_matches('/')
            ),
            discord: config.discord_token_url().to_string(),
        }
    }
}

pub struct OAuthExchanger {
    config: Config,
    token_urls: TokenUrls,
    client: ConnectorClient,
}

impl OAuthExchanger {
    pub fn new(config: &Config, client: ConnectorClient) -> Self {
        Self {
            config: config.clone(),
            token_urls: TokenUrls::from_config(config),
            client,
        }
    }

    /// Exchange `code` for the provider's credentials.
    ///
    /// Fails with a configuration error naming the missing variable before any
    /// request when the client id or secret is not set. Zapier has no exchange.
    pub async fn exchange_code(
        &self,
        provider: Provider,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Credentials, Error> {
        if code.trim().is_empty() {
            return Err(Error::validation("No authorization code provided"));
        }

        let exchange = self.exchange_for(provider)?;
        debug!("Exchanging {provider} authorization code");

        let tokens = exchange.exchange_code(code, redirect_uri).await?;
        info!("Exchanged {provider} authorization code for tokens");

        Ok(credentials_from_tokens(provider, tokens))
    }

    fn exchange_for(&self, provider: Provider) -> Result<Box<dyn OAuthProvider>, Error> {
        let config = &self.config;
        let client = self.client.clone();

        let exchange: Box<dyn OAuthProvider> = match provider {
            Provider::Slack => Box::new(slack::Provider::new(
                client_credentials(
                    config.slack_client_id(),
                    "SLACK_CLIENT_ID",
                    config.slack_client_secret(),
                    "SLACK_CLIENT_SECRET",
                )?,
                self.token_urls.slack.clone(),
                client,
            )),
            Provider::GoogleDrive => Box::new(google::Provider::new(
                client_credentials(
                    config.google_client_id(),
                    "GOOGLE_CLIENT_ID",
                    config.google_client_secret(),
                    "GOOGLE_CLIENT_SECRET",
                )?,
                self.token_urls.google.clone(),
                client,
            )),
            Provider::GoogleAnalytics => Box::new(google::Provider::new(
                client_credentials(
                    config.google_analytics_client_id(),
                    "GOOGLE_ANALYTICS_CLIENT_ID",
                    config.google_client_secret(),
                    "GOOGLE_CLIENT_SECRET",
                )?,
                self.token_urls.google.clone(),
                client,
            )),
            Provider::Notion => Box::new(notion::Provider::new(
                client_credentials(
                    config.notion_client_id(),
                    "NOTION_CLIENT_ID",
                    config.notion_client_secret(),
                    "NOTION_CLIENT_SECRET",
                )?,
                self.token_urls.notion.clone(),
                client,
            )),
            Provider::Discord => Box::new(discord::Provider::new(
                client_credentials(
                    config.discord_client_id(),
                    "DISCORD_CLIENT_ID",
                    config.discord_client_secret(),
                    "DISCORD_CLIENT_SECRET",
                )?,
                self.token_urls.discord.clone(),
                client,
            )),
            Provider::Zapier => {
                warn!("OAuth code exchange requested for Zapier, which has none");
                return Err(Error::unsupported(provider.as_str()));
            }
        };
        Ok(exchange)
    }
}

fn client_credentials(
    client_id: Option<String>,
    client_id_variable: &str,
    client_secret: Option<String>,
    client_secret_variable: &str,
) -> Result<ClientCredentials, Error> {
    let client_id = non_empty(client_id).ok_or_else(|| {
        warn!("{client_id_variable} is not configured");
        Error::config(client_id_variable)
    })?;
    let client_secret = non_empty(client_secret).ok_or_else(|| {
        warn!("{client_secret_variable} is not configured");
        Error::config(client_secret_variable)
    })?;
    Ok(ClientCredentials::new(client_id, client_secret))
}

fn credentials_from_tokens(provider: Provider, tokens: Tokens) -> Credentials {
    let access_token = Some(tokens.access_token.expose_secret().to_string());
    let refresh_token = tokens
        .refresh_token
        .as_ref()
        .map(|token| token.expose_secret().to_string());

    match provider {
        // Slack v2 returns the bot token as the primary token.
        Provider::Slack => Credentials::Slack(SlackCredentials {
            bot_token: access_token,
            access_token: tokens
                .user_access_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            workspace_id: tokens.workspace_id,
            channel_id: tokens.channel_id,
        }),
        Provider::GoogleDrive => Credentials::GoogleDrive(GoogleCredentials {
            access_token,
            refresh_token,
        }),
        Provider::GoogleAnalytics => Credentials::GoogleAnalytics(GoogleCredentials {
            access_token,
            refresh_token,
        }),
        Provider::Notion => Credentials::Notion(NotionCredentials {
            api_key: access_token,
            database_id: None,
        }),
        Provider::Discord => Credentials::Discord(DiscordCredentials {
            access_token,
            ..Default::default()
        }),
        Provider::Zapier => Credentials::Zapier(ZapierCredentials {
            access_token,
            webhook_url: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind, InternalErrorKind};
    use clap::Parser;
    use connector_auth::http::ConnectorClientBuilder;
    use mockito::Matcher;

    fn exchanger(args: &[&str]) -> OAuthExchanger {
        let mut argv = vec!["tandem"];
        argv.extend_from_slice(args);
        let config = Config::parse_from(argv);
        OAuthExchanger::new(&config, ConnectorClientBuilder::new().build().unwrap())
    }

    #[tokio::test]
    async fn slack_exchange_maps_bot_and_user_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth.v2.access")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "auth-code".into()),
                Matcher::UrlEncoded("client_id".into(), "slack-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "slack-secret".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://localhost:8080/integrations/callback".into(),
                ),
            ]))
            .with_body(
                r#"{"ok":true,"access_token":"xoxb-bot","token_type":"bot",
                    "team":{"id":"T1"},"authed_user":{"access_token":"xoxp-user"},
                    "incoming_webhook":{"channel_id":"C9"}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let url = server.url();
        let credentials = exchanger(&[
            "--slack-api-url",
            url.as_str(),
            "--slack-client-id",
            "slack-id",
            "--slack-client-secret",
            "slack-secret",
        ])
        .exchange_code(
            Provider::Slack,
            "auth-code",
            "http://localhost:8080/integrations/callback",
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(
            credentials,
            Credentials::Slack(SlackCredentials {
                bot_token: Some("xoxb-bot".to_string()),
                access_token: Some("xoxp-user".to_string()),
                workspace_id: Some("T1".to_string()),
                channel_id: Some("C9".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn slack_rejection_carries_slack_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth.v2.access")
            .with_body(r#"{"ok":false,"error":"invalid_code"}"#)
            .create_async()
            .await;

        let url = server.url();
        let err = exchanger(&[
            "--slack-api-url",
            url.as_str(),
            "--slack-client-id",
            "id",
            "--slack-client-secret",
            "secret",
        ])
        .exchange_code(Provider::Slack, "bad", "http://localhost/cb")
        .await
        .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Upstream("invalid_code".to_string()))
        );
    }

    #[tokio::test]
    async fn missing_secret_names_the_variable_without_a_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let url = server.url();
        let err = exchanger(&["--slack-api-url", url.as_str(), "--slack-client-id", "id"])
            .exchange_code(Provider::Slack, "code", "http://localhost/cb")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config(
                "SLACK_CLIENT_SECRET".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn analytics_uses_google_endpoint_and_shared_client_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("client_id".into(), "google-id".into()),
            ]))
            .with_body(
                r#"{"access_token":"ya29.ga","refresh_token":"1//ga","expires_in":3599,
                    "token_type":"Bearer","scope":"https://www.googleapis.com/auth/analytics.readonly"}"#,
            )
            .create_async()
            .await;

        let token_url = format!("{}/token", server.url());
        let credentials = exchanger(&[
            "--google-token-url",
            token_url.as_str(),
            "--google-client-id",
            "google-id",
            "--google-client-secret",
            "google-secret",
        ])
        .exchange_code(Provider::GoogleAnalytics, "code", "http://localhost/cb")
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(
            credentials,
            Credentials::GoogleAnalytics(GoogleCredentials {
                access_token: Some("ya29.ga".to_string()),
                refresh_token: Some("1//ga".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn notion_access_token_becomes_api_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_body(
                r#"{"access_token":"secret_notion","token_type":"bearer","bot_id":"b1",
                    "workspace_id":"w1"}"#,
            )
            .create_async()
            .await;

        let url = server.url();
        let credentials = exchanger(&[
            "--notion-api-url",
            url.as_str(),
            "--notion-client-id",
            "notion-id",
            "--notion-client-secret",
            "notion-secret",
        ])
        .exchange_code(Provider::Notion, "code", "http://localhost/cb")
        .await
        .unwrap();

        assert_eq!(
            credentials,
            Credentials::Notion(NotionCredentials {
                api_key: Some("secret_notion".to_string()),
                database_id: None,
            })
        );
    }

    #[tokio::test]
    async fn discord_drops_refresh_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/oauth2/token")
            .with_body(
                r#"{"access_token":"discord-access","token_type":"Bearer","expires_in":604800,
                    "refresh_token":"discord-refresh","scope":"identify"}"#,
            )
            .create_async()
            .await;

        let token_url = format!("{}/api/oauth2/token", server.url());
        let credentials = exchanger(&[
            "--discord-token-url",
            token_url.as_str(),
            "--discord-client-id",
            "discord-id",
            "--discord-client-secret",
            "discord-secret",
        ])
        .exchange_code(Provider::Discord, "code", "http://localhost/cb")
        .await
        .unwrap();

        assert_eq!(
            credentials,
            Credentials::Discord(DiscordCredentials {
                access_token: Some("discord-access".to_string()),
                ..Default::default()
            })
        );
    }

    #[tokio::test]
    async fn zapier_is_unsupported() {
        let err = exchanger(&[])
            .exchange_code(Provider::Zapier, "code", "http://localhost/cb")
            .await
            .unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Unsupported("zapier".to_string()))
        );
    }

    #[tokio::test]
    async fn empty_code_is_rejected() {
        let err = exchanger(&[])
            .exchange_code(Provider::Slack, "  ", "http://localhost/cb")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No authorization code provided");
    }
}
