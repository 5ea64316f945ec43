use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Third-party services a user can connect.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    EnumIter,
    Deserialize,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "integration_provider"
)]
pub enum Provider {
    #[sea_orm(string_value = "slack")]
    Slack,
    #[sea_orm(string_value = "google-drive")]
    GoogleDrive,
    #[sea_orm(string_value = "notion")]
    Notion,
    #[sea_orm(string_value = "zapier")]
    Zapier,
    #[sea_orm(string_value = "discord")]
    Discord,
    #[sea_orm(string_value = "google-analytics")]
    GoogleAnalytics,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::Slack,
        Provider::GoogleDrive,
        Provider::Notion,
        Provider::Zapier,
        Provider::Discord,
        Provider::GoogleAnalytics,
    ];

    /// The identifier used in URLs, OAuth state and persisted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Slack => "slack",
            Provider::GoogleDrive => "google-drive",
            Provider::Notion => "notion",
            Provider::Zapier => "zapier",
            Provider::Discord => "discord",
            Provider::GoogleAnalytics => "google-analytics",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an identifier names no known provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProvider(pub String);

impl fmt::Display for UnknownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown integration: {}", self.0)
    }
}

impl std::error::Error for UnknownProvider {}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == value)
            .ok_or_else(|| UnknownProvider(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>(), Ok(provider));
        }
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        assert_eq!(
            "myspace".parse::<Provider>(),
            Err(UnknownProvider("myspace".to_string()))
        );
        assert!("Slack".parse::<Provider>().is_err());
    }

    #[test]
    fn serde_matches_identifiers() {
        assert_eq!(
            serde_json::to_string(&Provider::GoogleAnalytics).unwrap(),
            "\"google-analytics\""
        );
        assert_eq!(
            serde_json::from_str::<Provider>("\"google-drive\"").unwrap(),
            Provider::GoogleDrive
        );
    }
}
