//! The compiled-in table of supported integrations.

use serde::Serialize;
use service::config::Config;

use crate::provider::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Communication,
    Storage,
    Productivity,
    Analytics,
}

/// Display metadata and OAuth parameters for one integration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationConfig {
    pub id: Provider,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub category: Category,
    pub setup_url: &'static str,
    pub oauth_url: &'static str,
    pub scopes: &'static [&'static str],
    /// Public OAuth client id, absent when not configured.
    pub client_id: Option<String>,
    /// Environment variable the client id is read from.
    #[serde(skip)]
    pub client_id_variable: &'static str,
}

/// Immutable registry of every [`Provider`], built once at start-up.
#[derive(Debug, Clone)]
pub struct Registry {
    configs: Vec<IntegrationConfig>,
}

impl Registry {
    pub fn new(config: &Config) -> Self {
        let configs = Provider::ALL
            .into_iter()
            .map(|provider| entry(provider, config))
            .collect();
        Self { configs }
    }

    pub fn get(&self, provider: Provider) -> &IntegrationConfig {
        // `configs` is built from `Provider::ALL` in declaration order.
        &self.configs[provider as usize]
    }

    pub fn lookup(&self, id: &str) -> Option<&IntegrationConfig> {
        id.parse::<Provider>().ok().map(|provider| self.get(provider))
    }

    pub fn all(&self) -> impl Iterator<Item = &IntegrationConfig> {
        self.configs.iter()
    }
}

fn entry(provider: Provider, config: &Config) -> IntegrationConfig {
    match provider {
        Provider::Slack => IntegrationConfig {
            id: provider,
            name: "Slack",
            description: "Send notifications and updates to your team channels",
            category: Category::Communication,
            setup_url: "https://api.slack.com/apps",
            oauth_url: "https://slack.com/oauth/v2/authorize",
            scopes: &[
                "chat:write",
                "channels:read",
                "groups:read",
                "im:read",
                "mpim:read",
            ],
            client_id: non_empty(config.slack_client_id()),
            client_id_variable: "SLACK_CLIENT_ID",
        },
        Provider::GoogleDrive => IntegrationConfig {
            id: provider,
            name: "Google Drive",
            description: "Store and sync files with your Google Drive account",
            category: Category::Storage,
            setup_url: "https://console.developers.google.com/",
            oauth_url: "https://accounts.google.com/o/oauth2/v2/auth",
            scopes: &[
                "https://www.googleapis.com/auth/drive.file",
                "https://www.googleapis.com/auth/drive.readonly",
            ],
            client_id: non_empty(config.google_client_id()),
            client_id_variable: "GOOGLE_CLIENT_ID",
        },
        Provider::Notion => IntegrationConfig {
            id: provider,
            name: "Notion",
            description: "Create and update pages in your Notion workspace",
            category: Category::Productivity,
            setup_url: "https://www.notion.so/my-integrations",
            oauth_url: "https://api.notion.com/v1/oauth/authorize",
            scopes: &["read", "write", "update"],
            client_id: non_empty(config.notion_client_id()),
            client_id_variable: "NOTION_CLIENT_ID",
        },
        Provider::Zapier => IntegrationConfig {
            id: provider,
            name: "Zapier",
            description: "Connect with 5000+ apps through automation workflows",
            category: Category::Productivity,
            setup_url: "https://zapier.com/apps",
            oauth_url: "https://zapier.com/oauth/authorize",
            scopes: &["read", "write"],
            client_id: non_empty(config.zapier_client_id()),
            client_id_variable: "ZAPIER_CLIENT_ID",
        },
        Provider::Discord => IntegrationConfig {
            id: provider,
            name: "Discord",
            description: "Send messages to Discord servers and channels",
            category: Category::Communication,
            setup_url: "https://discord.com/developers/applications",
            oauth_url: "https://discord.com/api/oauth2/authorize",
            scopes: &["bot", "messages:send", "channels:read"],
            client_id: non_empty(config.discord_client_id()),
            client_id_variable: "DISCORD_CLIENT_ID",
        },
        Provider::GoogleAnalytics => IntegrationConfig {
            id: provider,
            name: "Google Analytics",
            description: "Track user behavior and onboarding funnel metrics",
            category: Category::Analytics,
            setup_url: "https://analytics.google.com/",
            oauth_url: "https://accounts.google.com/o/oauth2/v2/auth",
            scopes: &["https://www.googleapis.com/auth/analytics.readonly"],
            client_id: non_empty(config.google_analytics_client_id()),
            client_id_variable: "GOOGLE_ANALYTICS_CLIENT_ID",
        },
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        use clap::Parser;
        let mut argv = vec!["tandem"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn every_provider_has_an_entry_in_order() {
        let registry = Registry::new(&config(&[]));
        for provider in Provider::ALL {
            assert_eq!(registry.get(provider).id, provider);
        }
        assert_eq!(registry.all().count(), 6);
    }

    #[test]
    fn lookup_by_identifier() {
        let registry = Registry::new(&config(&[]));
        assert_eq!(registry.lookup("notion").map(|c| c.name), Some("Notion"));
        assert_eq!(
            registry.lookup("google-analytics").map(|c| c.category),
            Some(Category::Analytics)
        );
        assert!(registry.lookup("myspace").is_none());
    }

    #[test]
    fn client_ids_come_from_configuration() {
        let registry = Registry::new(&config(&[
            "--slack-client-id",
            "slack-123",
            "--google-client-id",
            "google-456",
        ]));
        assert_eq!(
            registry.get(Provider::Slack).client_id.as_deref(),
            Some("slack-123")
        );
        assert_eq!(
            registry.get(Provider::GoogleAnalytics).client_id.as_deref(),
            Some("google-456")
        );
    }

    #[test]
    fn serializes_for_listing() {
        let registry = Registry::new(&config(&[]));
        let json = serde_json::to_value(registry.get(Provider::GoogleDrive)).unwrap();
        assert_eq!(json["id"], "google-drive");
        assert_eq!(json["type"], "storage");
        assert_eq!(json["oauthUrl"], "https://accounts.google.com/o/oauth2/v2/auth");
        assert!(json.get("clientIdVariable").is_none());
    }
}
