//! Outbound calls to the integration providers.
//!
//! [`ConnectorGateway`] validates credentials with one authenticated request
//! and relays messages for the providers that support it. Each provider lives
//! in its own module; the shared plumbing below sends a request and turns
//! non-2xx answers into upstream errors carrying the provider's own message.

mod discord;
mod google;
mod notion;
mod slack;
mod zapier;

use std::time::Duration;

use connector_auth::auth::{BearerTokenAuth, ProviderAuth};
use connector_auth::http::{provider_error_message, ConnectorClient, ConnectorClientBuilder};
use log::*;
use reqwest_middleware::RequestBuilder;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::config::Config;

use crate::credentials::Credentials;
use crate::error::Error;
use crate::provider::Provider;

/// Result of a successful provider call. Failures are returned as errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorResponse {
    pub success: bool,
    pub data: Value,
}

impl ConnectorResponse {
    fn ok(data: Value) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// What to send, and where. Destinations fall back to the stored credentials.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub message: String,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub database_id: Option<String>,
}

impl MessagePayload {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            ..Default::default()
        }
    }
}

/// Base URLs of every provider API.
#[derive(Debug, Clone)]
pub struct ApiUrls {
    pub slack: String,
    pub google: String,
    pub notion: String,
    pub zapier: String,
    pub discord: String,
}

impl ApiUrls {
    pub fn from_config(config: &Config) -> Self {
        let trim = |url: &str| url.trim_end_matches('/').to_string();
        Self {
            slack: trim(config.slack_api_url()),
            google: trim(config.google_api_url()),
            notion: trim(config.notion_api_url()),
            zapier: trim(config.zapier_api_url()),
            discord: trim(config.discord_api_url()),
        }
    }
}

pub struct ConnectorGateway {
    client: ConnectorClient,
    urls: ApiUrls,
}

impl ConnectorGateway {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = build_client(config)?;
        Ok(Self::with_client(client, ApiUrls::from_config(config)))
    }

    pub fn with_client(client: ConnectorClient, urls: ApiUrls) -> Self {
        Self { client, urls }
    }

    /// The HTTP client, shared with the OAuth exchanges.
    pub fn client(&self) -> &ConnectorClient {
        &self.client
    }

    /// Validate credentials with exactly one authenticated request.
    pub async fn test_connection(
        &self,
        credentials: &Credentials,
    ) -> Result<ConnectorResponse, Error> {
        debug!("Testing {} connection", credentials.provider());

        match credentials {
            Credentials::Slack(c) => slack::test(&self.client, &self.urls.slack, c).await,
            Credentials::GoogleDrive(c) => {
                google::test_drive(&self.client, &self.urls.google, c).await
            }
            Credentials::Notion(c) => notion::test(&self.client, &self.urls.notion, c).await,
            Credentials::Zapier(c) => zapier::test(&self.client, &self.urls.zapier, c).await,
            Credentials::Discord(c) => discord::test(&self.client, &self.urls.discord, c).await,
            Credentials::GoogleAnalytics(c) => {
                google::test_analytics(&self.client, &self.urls.google, c).await
            }
        }
    }

    /// Relay a message. Only Slack, Discord and Notion can receive one.
    pub async fn send_message(
        &self,
        credentials: &Credentials,
        payload: &MessagePayload,
    ) -> Result<ConnectorResponse, Error> {
        debug!("Sending message through {}", credentials.provider());

        match credentials {
            Credentials::Slack(c) => slack::send(&self.client, &self.urls.slack, c, payload).await,
            Credentials::Discord(c) => {
                discord::send(&self.client, &self.urls.discord, c, payload).await
            }
            Credentials::Notion(c) => {
                notion::send(&self.client, &self.urls.notion, c, payload).await
            }
            other => Err(Error::unsupported(other.provider().as_str())),
        }
    }
}

/// Build the shared outbound client from the configured timeout and retries.
pub fn build_client(config: &Config) -> Result<ConnectorClient, Error> {
    Ok(ConnectorClientBuilder::new()
        .with_timeout(Duration::from_secs(config.http_timeout_secs))
        .with_max_retries(config.http_max_retries)
        .build()?)
}

fn bearer(token: &str) -> BearerTokenAuth {
    BearerTokenAuth::new(SecretString::from(token.to_string()))
}

fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, Error> {
    value.as_deref().ok_or_else(|| Error::validation(message))
}

/// Send `request` and return the JSON body of a 2xx answer.
///
/// Non-2xx answers become upstream errors with the provider's message. The
/// body is logged, the request (and so the credential) never is.
async fn execute(provider: Provider, request: RequestBuilder) -> Result<Value, Error> {
    let response = request.send().await.map_err(|e| {
        warn!("Failed to reach {provider}: {e}");
        Error::from(e)
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        warn!("Failed to read {provider} response: {e}");
        Error::from(e)
    })?;

    if !status.is_success() {
        warn!("{provider} answered {status}: {body}");
        return Err(Error::upstream(&provider_error_message(
            status.as_u16(),
            &body,
        )));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!("Failed to parse {provider} response: {e}");
        Error::upstream(&format!("Invalid response from {provider}"))
    })
}
