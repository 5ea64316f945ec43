//! Discord: `users/@me` and channel messages.

use connector_auth::auth::{HeaderTokenAuth, ProviderAuth};
use connector_auth::http::ConnectorClient;
use secrecy::SecretString;
use serde::Serialize;

use super::{bearer, execute, required, ConnectorResponse, MessagePayload};
use crate::credentials::DiscordCredentials;
use crate::error::Error;
use crate::provider::Provider;

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

fn bot(token: &str) -> HeaderTokenAuth {
    HeaderTokenAuth::discord_bot(SecretString::from(token.to_string()))
}

/// A user token authenticates as `Bearer`, a bot token as `Bot`.
pub(super) async fn test(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &DiscordCredentials,
) -> Result<ConnectorResponse, Error> {
    let request = client.get(format!("{base_url}/users/@me"));
    let request = match (&credentials.access_token, &credentials.bot_token) {
        (Some(access_token), _) => bearer(access_token).authenticate(request),
        (None, Some(bot_token)) => bot(bot_token).authenticate(request),
        (None, None) => return Err(Error::validation("No access token provided")),
    };
    Ok(ConnectorResponse::ok(
        execute(Provider::Discord, request).await?,
    ))
}

pub(super) async fn send(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &DiscordCredentials,
    payload: &MessagePayload,
) -> Result<ConnectorResponse, Error> {
    let bot_token = required(&credentials.bot_token, "No bot token provided")?;
    let channel_id = payload
        .channel_id
        .as_deref()
        .or(credentials.channel_id.as_deref())
        .ok_or_else(|| Error::validation("No channel ID provided"))?;

    let url = format!(
        "{base_url}/channels/{}/messages",
        urlencoding::encode(channel_id)
    );
    let request = bot(bot_token)
        .authenticate(client.post(url))
        .json(&CreateMessage {
            content: &payload.message,
        });
    Ok(ConnectorResponse::ok(
        execute(Provider::Discord, request).await?,
    ))
}
