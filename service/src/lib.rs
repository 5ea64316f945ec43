use config::Config;
use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tokio::time::Duration;

pub mod config;
pub mod logging;

/// Database schema holding every platform table.
pub const DB_SCHEMA: &str = "tandem_platform";

/// Connects to Postgres when a database URL is configured.
///
/// Returns `Ok(None)` when no URL is set; callers fall back to in-memory storage.
pub async fn init_database(config: &Config) -> Result<Option<DatabaseConnection>, DbErr> {
    let Some(database_url) = config.database_url() else {
        return Ok(None);
    };

    info!(
        "Database pool config: max_connections={}, min_connections={}, \
         connect_timeout={}s, acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s",
        config.db_max_connections,
        config.db_min_connections,
        config.db_connect_timeout_secs,
        config.db_acquire_timeout_secs,
        config.db_idle_timeout_secs,
        config.db_max_lifetime_secs,
    );

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(config.db_connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug)
        .set_schema_search_path(DB_SCHEMA);

    let db = Database::connect(opt).await?;

    Ok(Some(db))
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Option<Arc<DatabaseConnection>>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, db: Option<&Arc<DatabaseConnection>>) -> Self {
        Self {
            database_connection: db.map(Arc::clone),
            config: app_config,
        }
    }

    pub fn db_conn_ref(&self) -> Option<&DatabaseConnection> {
        self.database_connection.as_deref()
    }
}
