use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default Slack Web API base URL used when `SLACK_API_URL` is not set.
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
/// Default Google APIs base URL (Drive and Analytics live under it).
pub const DEFAULT_GOOGLE_API_URL: &str = "https://www.googleapis.com";
/// Default Google OAuth token endpoint.
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Default Notion API base URL.
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com/v1";
/// Default Zapier API base URL.
pub const DEFAULT_ZAPIER_API_URL: &str = "https://api.zapier.com/v1";
/// Default Discord API base URL.
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";
/// Default Discord OAuth token endpoint.
pub const DEFAULT_DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of exact CORS origins allowed to call the proxy. Origins are matched
    /// verbatim; no wildcard or substring matching is performed.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:8080"
    )]
    pub allowed_origins: Vec<String>,

    /// Sets the Postgresql database URL to connect to. When unset, integration
    /// records are kept in process memory.
    #[arg(short, long, env)]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool
    #[arg(long, env, default_value_t = 20)]
    pub db_max_connections: u32,

    /// Minimum number of idle database connections to maintain
    #[arg(long, env, default_value_t = 2)]
    pub db_min_connections: u32,

    /// Timeout in seconds for establishing a new database connection
    #[arg(long, env, default_value_t = 8)]
    pub db_connect_timeout_secs: u64,

    /// Timeout in seconds for acquiring a connection from the pool
    #[arg(long, env, default_value_t = 8)]
    pub db_acquire_timeout_secs: u64,

    /// Seconds before an idle connection is closed
    #[arg(long, env, default_value_t = 600)]
    pub db_idle_timeout_secs: u64,

    /// Maximum lifetime in seconds for any connection in the pool
    #[arg(long, env, default_value_t = 1800)]
    pub db_max_lifetime_secs: u64,

    /// Slack OAuth client ID (public, also used to build authorize URLs).
    #[arg(long, env)]
    slack_client_id: Option<String>,
    /// Slack OAuth client secret used for the code exchange.
    #[arg(long, env)]
    slack_client_secret: Option<String>,

    /// Google OAuth client ID shared by Google Drive and, unless overridden,
    /// Google Analytics.
    #[arg(long, env)]
    google_client_id: Option<String>,
    /// Google OAuth client secret used for the code exchange.
    #[arg(long, env)]
    google_client_secret: Option<String>,
    /// Google Analytics specific OAuth client ID.
    #[arg(long, env)]
    google_analytics_client_id: Option<String>,

    /// Notion public integration client ID.
    #[arg(long, env)]
    notion_client_id: Option<String>,
    /// Notion public integration client secret.
    #[arg(long, env)]
    notion_client_secret: Option<String>,

    /// Discord application client ID.
    #[arg(long, env)]
    discord_client_id: Option<String>,
    /// Discord application client secret.
    #[arg(long, env)]
    discord_client_secret: Option<String>,

    /// Zapier client ID. Zapier has no supported code exchange; the ID is only
    /// used to build the authorize URL.
    #[arg(long, env)]
    zapier_client_id: Option<String>,

    /// 32-byte hex key (64 characters) used to encrypt stored credentials with
    /// AES-256-GCM. When unset, credentials are stored as plain JSON.
    #[arg(long, env)]
    encryption_key: Option<String>,

    /// Secret used to sign the OAuth `state` parameter.
    #[arg(long, env)]
    oauth_state_secret: Option<String>,

    /// Seconds an issued OAuth `state` stays valid.
    #[arg(long, env, default_value_t = 600)]
    pub oauth_state_ttl_secs: u64,

    /// The base URL of the frontend application. The OAuth callback redirects
    /// back to `{frontend_base_url}/integrations`.
    #[arg(long, env, default_value = "http://localhost:8080")]
    frontend_base_url: String,

    /// Timeout in seconds for every outbound provider request.
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Number of retries for transient provider failures. Zero keeps the
    /// one-call-per-operation behavior.
    #[arg(long, env, default_value_t = 0)]
    pub http_max_retries: u32,

    /// The base URL of the Slack Web API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_SLACK_API_URL)]
    slack_api_url: String,
    /// The base URL of the Google APIs (Drive, Analytics).
    #[arg(long, env, default_value = DEFAULT_GOOGLE_API_URL)]
    google_api_url: String,
    /// The Google OAuth token endpoint.
    #[arg(long, env, default_value = DEFAULT_GOOGLE_TOKEN_URL)]
    google_token_url: String,
    /// The base URL of the Notion API.
    #[arg(long, env, default_value = DEFAULT_NOTION_API_URL)]
    notion_api_url: String,
    /// The base URL of the Zapier API.
    #[arg(long, env, default_value = DEFAULT_ZAPIER_API_URL)]
    zapier_api_url: String,
    /// The base URL of the Discord API.
    #[arg(long, env, default_value = DEFAULT_DISCORD_API_URL)]
    discord_api_url: String,
    /// The Discord OAuth token endpoint.
    #[arg(long, env, default_value = DEFAULT_DISCORD_TOKEN_URL)]
    discord_token_url: String,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 3001)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Builds a configuration from defaults and environment only, ignoring the
    /// process arguments. Used by tests, where the harness owns argv.
    pub fn from_env() -> Self {
        Config::parse_from([env!("CARGO_PKG_NAME")])
    }

    pub fn set_database_url(mut self, database_url: String) -> Self {
        self.database_url = Some(database_url);
        self
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn slack_client_id(&self) -> Option<String> {
        self.slack_client_id.clone()
    }

    pub fn slack_client_secret(&self) -> Option<String> {
        self.slack_client_secret.clone()
    }

    pub fn google_client_id(&self) -> Option<String> {
        self.google_client_id.clone()
    }

    pub fn google_client_secret(&self) -> Option<String> {
        self.google_client_secret.clone()
    }

    /// Falls back to the shared Google client ID when no Analytics specific ID is set.
    pub fn google_analytics_client_id(&self) -> Option<String> {
        self.google_analytics_client_id
            .clone()
            .or_else(|| self.google_client_id.clone())
    }

    pub fn notion_client_id(&self) -> Option<String> {
        self.notion_client_id.clone()
    }

    pub fn notion_client_secret(&self) -> Option<String> {
        self.notion_client_secret.clone()
    }

    pub fn discord_client_id(&self) -> Option<String> {
        self.discord_client_id.clone()
    }

    pub fn discord_client_secret(&self) -> Option<String> {
        self.discord_client_secret.clone()
    }

    pub fn zapier_client_id(&self) -> Option<String> {
        self.zapier_client_id.clone()
    }

    pub fn encryption_key(&self) -> Option<String> {
        self.encryption_key.clone()
    }

    pub fn oauth_state_secret(&self) -> Option<String> {
        self.oauth_state_secret.clone()
    }

    /// Returns the frontend application base URL without a trailing slash.
    pub fn frontend_base_url(&self) -> &str {
        self.frontend_base_url.trim_end_matches('/')
    }

    pub fn slack_api_url(&self) -> &str {
        &self.slack_api_url
    }

    pub fn google_api_url(&self) -> &str {
        &self.google_api_url
    }

    pub fn google_token_url(&self) -> &str {
        &self.google_token_url
    }

    pub fn notion_api_url(&self) -> &str {
        &self.notion_api_url
    }

    pub fn zapier_api_url(&self) -> &str {
        &self.zapier_api_url
    }

    pub fn discord_api_url(&self) -> &str {
        &self.discord_api_url
    }

    pub fn discord_token_url(&self) -> &str {
        &self.discord_token_url
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_env_parses_case_insensitively() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }

    #[test]
    fn allowed_origins_are_split_on_commas() {
        let config = Config::parse_from([
            "tandem",
            "--allowed-origins",
            "http://localhost:8080,https://app.example.com",
        ]);
        assert_eq!(
            config.allowed_origins,
            vec![
                "http://localhost:8080".to_string(),
                "https://app.example.com".to_string()
            ]
        );
    }

    #[test]
    fn google_analytics_client_id_falls_back_to_google_client_id() {
        let config = Config::parse_from(["tandem", "--google-client-id", "shared-google-id"]);
        assert_eq!(
            config.google_analytics_client_id(),
            Some("shared-google-id".to_string())
        );

        let config = Config::parse_from([
            "tandem",
            "--google-client-id",
            "shared-google-id",
            "--google-analytics-client-id",
            "ga-id",
        ]);
        assert_eq!(config.google_analytics_client_id(), Some("ga-id".to_string()));
    }

    #[test]
    fn frontend_base_url_strips_trailing_slash() {
        let config = Config::parse_from(["tandem", "--frontend-base-url", "https://app.example.com/"]);
        assert_eq!(config.frontend_base_url(), "https://app.example.com");
    }
}
