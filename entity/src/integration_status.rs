use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Persisted state of an integration record.
///
/// A user with no record for a provider is disconnected; that state is never stored.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "integration_status"
)]
pub enum IntegrationStatus {
    /// Credentials stored, not yet validated against the provider
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Last validation call succeeded
    #[sea_orm(string_value = "connected")]
    Connected,
    /// Last validation call failed
    #[sea_orm(string_value = "error")]
    Error,
}

impl std::fmt::Display for IntegrationStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrationStatus::Pending => write!(fmt, "pending"),
            IntegrationStatus::Connected => write!(fmt, "connected"),
            IntegrationStatus::Error => write!(fmt, "error"),
        }
    }
}
