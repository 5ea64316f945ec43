//! Parameters for the connector proxy and per-user integration endpoints.

use chrono::{DateTime, Utc};
use domain::credentials::CredentialBag;
use domain::gateway::MessagePayload;
use domain::integration::Status;
use domain::provider::Provider;
use domain::store::IntegrationRecord;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A credential bag for one provider. A missing bag reads as empty.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CredentialsParams {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub credentials: CredentialBag,
}

/// Credentials are optional when testing a stored integration.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TestParams {
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub credentials: Option<CredentialBag>,
}

/// Body of `POST /api/integrations/send/{provider}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendParams {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub credentials: CredentialBag,
    #[serde(default)]
    pub message: String,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub database_id: Option<String>,
}

impl SendParams {
    pub fn into_parts(self) -> (CredentialBag, MessagePayload) {
        let payload = MessagePayload {
            message: self.message,
            channel: self.channel,
            channel_id: self.channel_id,
            database_id: self.database_id,
        };
        (self.credentials, payload)
    }
}

/// Body of `POST /api/integrations/oauth/token`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenParams {
    #[serde(default)]
    pub integration_id: String,
    #[serde(default)]
    pub code: String,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(value_type = Object)]
    pub credentials: CredentialBag,
}

/// Body of `POST /api/users/{user_id}/integrations/{provider}/send`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MessageParams {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    #[schema(value_type = String, example = "connected")]
    pub status: Status,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutcomeResponse {
    pub success: bool,
}

/// A stored integration without its credentials.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSummary {
    pub provider: Provider,
    #[schema(value_type = String, example = "connected")]
    pub status: Status,
    #[schema(value_type = Option<String>)]
    pub connected_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub last_activity: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<IntegrationRecord> for IntegrationSummary {
    fn from(record: IntegrationRecord) -> Self {
        Self {
            provider: record.provider,
            status: record.status.into(),
            connected_at: record.connected_at,
            last_activity: record.last_activity,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntegrationList {
    pub integrations: Vec<IntegrationSummary>,
}
