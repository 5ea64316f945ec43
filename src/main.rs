use std::sync::Arc;

use connector_auth::encryption::Cipher;
use domain::integration::IntegrationManager;
use domain::store::{DbIntegrationStore, IntegrationStore, MemoryIntegrationStore};
use log::*;
use migration::{Migrator, MigratorTrait};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config as &Config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!("Starting up Tandem integrations proxy...");

    let db = match service::init_database(&config).await {
        Ok(db) => db.map(Arc::new),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn IntegrationStore> = match &db {
        Some(db) => {
            if let Err(e) = Migrator::up(db.as_ref(), None).await {
                error!("Failed to run database migrations: {e}");
                std::process::exit(1);
            }
            let cipher = match config.encryption_key() {
                Some(key) => match Cipher::from_hex(&key) {
                    Ok(cipher) => Some(cipher),
                    Err(e) => {
                        error!("ENCRYPTION_KEY is not a valid 32-byte hex key: {e}");
                        std::process::exit(1);
                    }
                },
                None => None,
            };
            info!("Storing integrations in Postgres");
            Arc::new(DbIntegrationStore::new(Arc::clone(db), cipher))
        }
        None => {
            warn!("DATABASE_URL is not set; integrations are kept in memory only");
            Arc::new(MemoryIntegrationStore::new())
        }
    };

    let integrations = match IntegrationManager::from_config(&config, store) {
        Ok(integrations) => Arc::new(integrations),
        Err(e) => {
            error!("Failed to configure integrations: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, db.as_ref());
    let app_state = web::AppState::new(service_state, integrations);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
