use connector_auth::auth::ProviderAuth;
use connector_auth::http::ConnectorClient;

use super::{bearer, execute, required, ConnectorResponse};
use crate::credentials::ZapierCredentials;
use crate::error::Error;
use crate::provider::Provider;

pub(super) async fn test(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &ZapierCredentials,
) -> Result<ConnectorResponse, Error> {
    let token = required(&credentials.access_token, "No access token provided")?;
    let request = bearer(token).authenticate(client.get(format!("{base_url}/me")));
    Ok(ConnectorResponse::ok(
        execute(Provider::Zapier, request).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::tests::gateway;
    use crate::credentials::{Credentials, ZapierCredentials};

    #[tokio::test]
    async fn reads_me() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/me")
            .match_header("authorization", "Bearer zap-token")
            .with_body(r#"{"email":"ops@example.com"}"#)
            .create_async()
            .await;

        let credentials = Credentials::Zapier(ZapierCredentials {
            access_token: Some("zap-token".to_string()),
            webhook_url: Some("https://hooks.zapier.com/hooks/catch/1/abc".to_string()),
        });
        let response = gateway(&server)
            .test_connection(&credentials)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.data["email"], "ops@example.com");
    }
}
