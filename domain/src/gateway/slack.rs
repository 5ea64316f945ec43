//! Slack Web API: `auth.test` and `chat.postMessage`.

use connector_auth::auth::ProviderAuth;
use connector_auth::http::ConnectorClient;
use log::*;
use serde::Serialize;
use serde_json::Value;

use super::{bearer, execute, ConnectorResponse, MessagePayload};
use crate::credentials::SlackCredentials;
use crate::error::Error;
use crate::provider::Provider;

const DEFAULT_CHANNEL: &str = "#general";

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

fn token(credentials: &SlackCredentials) -> Result<&str, Error> {
    credentials
        .bot_token
        .as_deref()
        .or(credentials.access_token.as_deref())
        .ok_or_else(|| Error::validation("No token provided"))
}

pub(super) async fn test(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &SlackCredentials,
) -> Result<ConnectorResponse, Error> {
    let request = bearer(token(credentials)?).authenticate(client.get(format!("{base_url}/auth.test")));
    require_ok(execute(Provider::Slack, request).await?)
}

pub(super) async fn send(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &SlackCredentials,
    payload: &MessagePayload,
) -> Result<ConnectorResponse, Error> {
    let token = token(credentials)?;
    let channel = payload
        .channel
        .as_deref()
        .or(credentials.channel_id.as_deref())
        .unwrap_or(DEFAULT_CHANNEL);

    let request = bearer(token)
        .authenticate(client.post(format!("{base_url}/chat.postMessage")))
        .json(&PostMessage {
            channel,
            text: &payload.message,
        });
    require_ok(execute(Provider::Slack, request).await?)
}

/// Slack answers 200 for logical failures; `ok` decides.
fn require_ok(data: Value) -> Result<ConnectorResponse, Error> {
    if data.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(ConnectorResponse::ok(data));
    }

    let reason = data
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error");
    warn!("Slack rejected the request: {reason}");
    Err(Error::upstream(reason))
}
