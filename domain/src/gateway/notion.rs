//! Notion: `users/me` and page creation in a database.

use connector_auth::auth::ProviderAuth;
use connector_auth::http::ConnectorClient;
use serde_json::json;

use super::{bearer, execute, required, ConnectorResponse, MessagePayload};
use crate::credentials::NotionCredentials;
use crate::error::Error;
use crate::provider::Provider;

pub(crate) const NOTION_VERSION: &str = "2022-06-28";

pub(super) async fn test(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &NotionCredentials,
) -> Result<ConnectorResponse, Error> {
    let api_key = required(&credentials.api_key, "No API key provided")?;
    let request = bearer(api_key)
        .authenticate(client.get(format!("{base_url}/users/me")))
        .header("Notion-Version", NOTION_VERSION);
    Ok(ConnectorResponse::ok(
        execute(Provider::Notion, request).await?,
    ))
}

pub(super) async fn send(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &NotionCredentials,
    payload: &MessagePayload,
) -> Result<ConnectorResponse, Error> {
    let api_key = required(&credentials.api_key, "No API key provided")?;
    let database_id = payload
        .database_id
        .as_deref()
        .or(credentials.database_id.as_deref())
        .ok_or_else(|| Error::validation("No database ID provided"))?;

    let page = json!({
        "parent": { "database_id": database_id },
        "properties": {
            "title": {
                "title": [{ "text": { "content": payload.message } }]
            }
        }
    });

    let request = bearer(api_key)
        .authenticate(client.post(format!("{base_url}/pages")))
        .header("Notion-Version", NOTION_VERSION)
        .json(&page);
    Ok(ConnectorResponse::ok(
        execute(Provider::Notion, request).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::tests::gateway;
    use super::super::MessagePayload;
    use super::NOTION_VERSION;
    use crate::credentials::{Credentials, NotionCredentials};
    use mockito::Matcher;

    fn notion(database_id: Option<&str>) -> Credentials {
        Credentials::Notion(NotionCredentials {
            api_key: Some("secret_notion".to_string()),
            database_id: database_id.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn users_me_sends_version_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer secret_notion")
            .match_header("notion-version", NOTION_VERSION)
            .with_body(r#"{"object":"user","type":"bot"}"#)
            .create_async()
            .await;

        let response = gateway(&server)
            .test_connection(&notion(None))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.data["type"], "bot");
    }

    #[tokio::test]
    async fn creates_page_in_requested_database() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/pages")
            .match_header("notion-version", NOTION_VERSION)
            .match_body(Matcher::Json(serde_json::json!({
                "parent": { "database_id": "db-requested" },
                "properties": {
                    "title": { "title": [{ "text": { "content": "Quarterly update" } }] }
                }
            })))
            .with_body(r#"{"object":"page","id":"page-1"}"#)
            .create_async()
            .await;

        let mut payload = MessagePayload::new("Quarterly update");
        payload.database_id = Some("db-requested".to_string());
        let response = gateway(&server)
            .send_message(&notion(Some("db-stored")), &payload)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.data["id"], "page-1");
    }

    #[tokio::test]
    async fn missing_database_is_a_validation_error() {
        let server = mockito::Server::new_async().await;
        let err = gateway(&server)
            .send_message(&notion(None), &MessagePayload::new("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No database ID provided");
    }
}
