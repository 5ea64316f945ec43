//! Google Drive and Google Analytics connection tests.

use connector_auth::auth::ProviderAuth;
use connector_auth::http::ConnectorClient;

use super::{bearer, execute, required, ConnectorResponse};
use crate::credentials::GoogleCredentials;
use crate::error::Error;
use crate::provider::Provider;

pub(super) async fn test_drive(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &GoogleCredentials,
) -> Result<ConnectorResponse, Error> {
    let token = required(&credentials.access_token, "No access token provided")?;
    let request = bearer(token)
        .authenticate(client.get(format!("{base_url}/drive/v3/about")))
        .query(&[("fields", "user")]);
    Ok(ConnectorResponse::ok(
        execute(Provider::GoogleDrive, request).await?,
    ))
}

pub(super) async fn test_analytics(
    client: &ConnectorClient,
    base_url: &str,
    credentials: &GoogleCredentials,
) -> Result<ConnectorResponse, Error> {
    let token = required(&credentials.access_token, "No access token provided")?;
    let request = bearer(token).authenticate(
        client.get(format!("{base_url}/analytics/v3/management/accounts")),
    );
    Ok(ConnectorResponse::ok(
        execute(Provider::GoogleAnalytics, request).await?,
    ))
}
