//! Notion public integration OAuth provider.
//!
//! Notion authenticates the client with HTTP basic auth and takes a JSON body.

use async_trait::async_trait;
use log::*;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::{network_error, read_token_response};
use crate::error::Error;
use crate::http::ConnectorClient;
use crate::oauth::{ClientCredentials, ProviderKind, Tokens};

pub const DEFAULT_TOKEN_URL: &str = "https://api.notion.com/v1/oauth/token";

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    grant_type: &'static str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    workspace_id: Option<String>,
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
        ProviderKind::Notion
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Tokens, Error> {
        let request = TokenExchangeRequest {
            grant_type: "authorization_code",
            code,
            redirect_uri,
        };

        debug!("Exchanging Notion OAuth code for tokens");

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| network_error("Notion", e))?;

        let body: TokenResponse = read_token_response("Notion", response).await?;
        info!("Successfully exchanged Notion OAuth code for tokens");

        let mut tokens = Tokens::new(body.access_token, body.token_type);
        tokens.workspace_id = body.workspace_id;
        Ok(tokens)
    }
}
