use crate::integration_status::IntegrationStatus;
use crate::provider::Provider;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One connection between a user and a provider. `(user_id, provider)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[sea_orm(schema_name = "tandem_platform", table_name = "integrations")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,
    /// Identity-provider user id; users are not stored locally.
    pub user_id: String,
    pub provider: Provider,
    pub status: IntegrationStatus,
    /// Credential JSON, AES-256-GCM ciphertext when `encrypted` is set.
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub credentials: String,
    #[serde(skip_serializing)]
    pub encrypted: bool,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub connected_at: Option<DateTimeWithTimeZone>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_activity: Option<DateTimeWithTimeZone>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
