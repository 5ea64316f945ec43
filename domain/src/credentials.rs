//! Per-provider integration credentials.
//!
//! Browsers send one loose camelCase bag for every provider ([`CredentialBag`]).
//! It is narrowed at the boundary into [`Credentials`], whose variants carry
//! only the fields their provider reads. Empty strings count as absent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// The loose credential shape used on the wire. Unknown fields are ignored.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialBag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl CredentialBag {
    fn present_fields(&self) -> Vec<&'static str> {
        [
            ("accessToken", &self.access_token),
            ("refreshToken", &self.refresh_token),
            ("apiKey", &self.api_key),
            ("botToken", &self.bot_token),
            ("workspaceId", &self.workspace_id),
            ("channelId", &self.channel_id),
            ("databaseId", &self.database_id),
            ("webhookUrl", &self.webhook_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_some())
        .map(|(name, _)| name)
        .collect()
    }
}

// Only field names are printed so secrets never reach the logs.
impl fmt::Debug for CredentialBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBag")
            .field("present", &self.present_fields())
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackCredentials {
    pub bot_token: Option<String>,
    pub access_token: Option<String>,
    pub workspace_id: Option<String>,
    pub channel_id: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotionCredentials {
    pub api_key: Option<String>,
    pub database_id: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZapierCredentials {
    pub access_token: Option<String>,
    pub webhook_url: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordCredentials {
    pub access_token: Option<String>,
    pub bot_token: Option<String>,
    pub channel_id: Option<String>,
}

/// Credentials for one provider. Persisted as JSON tagged by `provider`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "kebab-case")]
pub enum Credentials {
    Slack(SlackCredentials),
    GoogleDrive(GoogleCredentials),
    Notion(NotionCredentials),
    Zapier(ZapierCredentials),
    Discord(DiscordCredentials),
    GoogleAnalytics(GoogleCredentials),
}

impl Credentials {
    /// Narrow a wire bag to the fields `provider` uses.
    pub fn from_bag(provider: Provider, bag: CredentialBag) -> Self {
        let CredentialBag {
            access_token,
            refresh_token,
            api_key,
            bot_token,
            workspace_id,
            channel_id,
            database_id,
            webhook_url,
        } = bag;

        match provider {
            Provider::Slack => Credentials::Slack(SlackCredentials {
                bot_token: present(bot_token),
                access_token: present(access_token),
                workspace_id: present(workspace_id),
                channel_id: present(channel_id),
            }),
            Provider::GoogleDrive => Credentials::GoogleDrive(GoogleCredentials {
                access_token: present(access_token),
                refresh_token: present(refresh_token),
            }),
            Provider::Notion => Credentials::Notion(NotionCredentials {
                api_key: present(api_key),
                database_id: present(database_id),
            }),
            Provider::Zapier => Credentials::Zapier(ZapierCredentials {
                access_token: present(access_token),
                webhook_url: present(webhook_url),
            }),
            Provider::Discord => Credentials::Discord(DiscordCredentials {
                access_token: present(access_token),
                bot_token: present(bot_token),
                channel_id: present(channel_id),
            }),
            Provider::GoogleAnalytics => Credentials::GoogleAnalytics(GoogleCredentials {
                access_token: present(access_token),
                refresh_token: present(refresh_token),
            }),
        }
    }

    /// Widen back to the wire bag, e.g. for an OAuth exchange response.
    pub fn into_bag(self) -> CredentialBag {
        match self {
            Credentials::Slack(c) => CredentialBag {
                bot_token: c.bot_token,
                access_token: c.access_token,
                workspace_id: c.workspace_id,
                channel_id: c.channel_id,
                ..Default::default()
            },
            Credentials::GoogleDrive(c) | Credentials::GoogleAnalytics(c) => CredentialBag {
                access_token: c.access_token,
                refresh_token: c.refresh_token,
                ..Default::default()
            },
            Credentials::Notion(c) => CredentialBag {
                api_key: c.api_key,
                database_id: c.database_id,
                ..Default::default()
            },
            Credentials::Zapier(c) => CredentialBag {
                access_token: c.access_token,
                webhook_url: c.webhook_url,
                ..Default::default()
            },
            Credentials::Discord(c) => CredentialBag {
                access_token: c.access_token,
                bot_token: c.bot_token,
                channel_id: c.channel_id,
                ..Default::default()
            },
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Credentials::Slack(_) => Provider::Slack,
            Credentials::GoogleDrive(_) => Provider::GoogleDrive,
            Credentials::Notion(_) => Provider::Notion,
            Credentials::Zapier(_) => Provider::Zapier,
            Credentials::Discord(_) => Provider::Discord,
            Credentials::GoogleAnalytics(_) => Provider::GoogleAnalytics,
        }
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.clone().into_bag() == CredentialBag::default()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("provider", &self.provider())
            .field("present", &self.clone().into_bag().present_fields())
            .finish()
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
