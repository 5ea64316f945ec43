//! Controller for the integration registry and each user's stored integrations.
//!
//! Stored credentials never leave the server; listings return status and timestamps only.

use crate::controller::ApiResponse;
use crate::params::integration::{
    CredentialsParams, IntegrationList, IntegrationSummary, MessageParams, OutcomeResponse,
    StatusResponse, TestParams,
};
use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use domain::credentials::Credentials;
use domain::provider::Provider;
use domain::registry::IntegrationConfig;

#[derive(Serialize)]
struct RegistryListing {
    integrations: Vec<IntegrationConfig>,
}

/// GET every supported integration
#[utoipa::path(
    get,
    path = "/api/integrations",
    responses(
        (status = 200, description = "Registry of supported integrations with their OAuth parameters"),
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let integrations = app_state.integrations.registry().all().cloned().collect();
    Ok(Json(ApiResponse::ok(RegistryListing { integrations })))
}

/// GET a user's stored integrations
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/integrations",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Stored integrations without credentials", body = IntegrationList),
    )
)]
pub async fn list(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let integrations = app_state
        .integrations
        .list_integrations(&user_id)
        .await?
        .into_iter()
        .map(IntegrationSummary::from)
        .collect();

    Ok(Json(ApiResponse::ok(IntegrationList { integrations })))
}

/// GET the connection status of one integration
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/integrations/{provider}",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("provider" = String, Path, description = "Integration identifier"),
    ),
    responses(
        (status = 200, description = "`disconnected`, `pending`, `connected` or `error`", body = StatusResponse),
        (status = 400, description = "Unknown integration"),
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path((user_id, provider)): Path<(String, String)>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = provider.parse()?;
    let status = app_state
        .integrations
        .get_integration_status(&user_id, provider)
        .await?;

    Ok(Json(ApiResponse::ok(StatusResponse { status })))
}

/// POST store and validate credentials for an integration
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/integrations/{provider}/connect",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("provider" = String, Path, description = "Integration identifier"),
    ),
    request_body = CredentialsParams,
    responses(
        (status = 200, description = "`success` is true once the provider accepted the credentials", body = OutcomeResponse),
        (status = 400, description = "Unknown integration"),
    )
)]
pub async fn connect(
    State(app_state): State<AppState>,
    Path((user_id, provider)): Path<(String, String)>,
    Json(params): Json<CredentialsParams>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = provider.parse()?;
    let credentials = Credentials::from_bag(provider, params.credentials);
    let success = app_state
        .integrations
        .connect_integration(&user_id, provider, credentials)
        .await?;

    Ok(Json(OutcomeResponse { success }))
}

/// POST test supplied credentials, or the stored ones when none are given
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/integrations/{provider}/test",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("provider" = String, Path, description = "Integration identifier"),
    ),
    request_body = TestParams,
    responses(
        (status = 200, description = "Whether the provider accepted the credentials", body = OutcomeResponse),
        (status = 400, description = "Unknown integration"),
    )
)]
pub async fn test(
    State(app_state): State<AppState>,
    Path((user_id, provider)): Path<(String, String)>,
    Json(params): Json<TestParams>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = provider.parse()?;
    let credentials = params
        .credentials
        .map(|bag| Credentials::from_bag(provider, bag));
    let success = app_state
        .integrations
        .test_integration(&user_id, provider, credentials)
        .await?;

    Ok(Json(OutcomeResponse { success }))
}

/// POST send a test message through a connected integration
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/integrations/{provider}/send",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("provider" = String, Path, description = "Integration identifier"),
    ),
    request_body = MessageParams,
    responses(
        (status = 200, description = "Whether the provider delivered the message", body = OutcomeResponse),
        (status = 400, description = "Unknown integration or integration not connected"),
    )
)]
pub async fn send(
    State(app_state): State<AppState>,
    Path((user_id, provider)): Path<(String, String)>,
    Json(params): Json<MessageParams>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = provider.parse()?;
    let success = app_state
        .integrations
        .send_test_message(&user_id, provider, &params.message)
        .await?;

    Ok(Json(OutcomeResponse { success }))
}

/// DELETE an integration and its stored credentials
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/integrations/{provider}",
    params(
        ("user_id" = String, Path, description = "User ID"),
        ("provider" = String, Path, description = "Integration identifier"),
    ),
    responses(
        (status = 200, description = "`success` is false when nothing was stored", body = OutcomeResponse),
        (status = 400, description = "Unknown integration"),
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path((user_id, provider)): Path<(String, String)>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = provider.parse()?;
    let success = app_state
        .integrations
        .disconnect_integration(&user_id, provider)
        .await?;

    Ok(Json(OutcomeResponse { success }))
}
