use crate::controller::{
    health_check_controller, integration_controller, oauth_controller, proxy_controller,
};
use crate::{cors_layer, params, AppState};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Tandem Integrations API"
        ),
        paths(
            health_check_controller::health_check,
            proxy_controller::test,
            proxy_controller::send,
            proxy_controller::exchange_token,
            integration_controller::index,
            integration_controller::list,
            integration_controller::read,
            integration_controller::connect,
            integration_controller::test,
            integration_controller::send,
            integration_controller::delete,
            oauth_controller::authorize,
            oauth_controller::callback,
            oauth_controller::completion,
        ),
        components(
            schemas(
                domain::provider::Provider,
                params::integration::CredentialsParams,
                params::integration::TestParams,
                params::integration::SendParams,
                params::integration::TokenParams,
                params::integration::TokenResponse,
                params::integration::MessageParams,
                params::integration::StatusResponse,
                params::integration::OutcomeResponse,
                params::integration::IntegrationSummary,
                params::integration::IntegrationList,
            )
        ),
        tags(
            (name = "tandem_integrations", description = "Third-party integration connector proxy")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(app_state.config());

    Router::new()
        .merge(health_routes())
        .merge(proxy_routes(app_state.clone()))
        .merge(integration_routes(app_state.clone()))
        .merge(user_integration_routes(app_state.clone()))
        .merge(oauth_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(cors)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn proxy_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/integrations/test/{provider}",
            post(proxy_controller::test),
        )
        .route(
            "/api/integrations/send/{provider}",
            post(proxy_controller::send),
        )
        .route(
            "/api/integrations/oauth/token",
            post(proxy_controller::exchange_token),
        )
        .with_state(app_state)
}

fn integration_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/integrations", get(integration_controller::index))
        .with_state(app_state)
}

fn user_integration_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/users/{user_id}/integrations",
            get(integration_controller::list),
        )
        .route(
            "/api/users/{user_id}/integrations/{provider}",
            get(integration_controller::read).delete(integration_controller::delete),
        )
        .route(
            "/api/users/{user_id}/integrations/{provider}/connect",
            post(integration_controller::connect),
        )
        .route(
            "/api/users/{user_id}/integrations/{provider}/test",
            post(integration_controller::test),
        )
        .route(
            "/api/users/{user_id}/integrations/{provider}/send",
            post(integration_controller::send),
        )
        .with_state(app_state)
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/api/integrations/{provider}/authorize",
            get(oauth_controller::authorize),
        )
        .route(
            "/api/integrations/oauth/completion",
            get(oauth_controller::completion),
        )
        .route("/integrations/callback", get(oauth_controller::callback))
        .with_state(app_state)
}
