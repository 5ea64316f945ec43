use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use domain::integration::IntegrationManager;
use log::*;
use service::config::Config;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

mod controller;
mod error;
mod params;
pub(crate) mod router;

pub use error::{Error, Result};

const COMPLETION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// Web-level state: the service infrastructure plus the shared integration manager.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub integrations: Arc<IntegrationManager>,
}

impl AppState {
    pub fn new(service_state: service::AppState, integrations: Arc<IntegrationManager>) -> Self {
        Self {
            service_state,
            integrations,
        }
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config()
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{interface}:{}", app_state.config().port);

    info!(
        "Allowed CORS origins: {:?}",
        app_state.config().allowed_origins
    );
    spawn_completion_sweeper(Arc::clone(&app_state.integrations));

    let app = router::define_routes(app_state);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server listening on http://{server_url}");

    axum::serve(listener, app).await
}

/// Exact-origin allow-list. Origins that fail to parse as header values are skipped.
pub(crate) fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

fn spawn_completion_sweeper(integrations: Arc<IntegrationManager>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(COMPLETION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            integrations.completions().sweep();
        }
    });
}
