//! Stateless connector proxy: the browser supplies credentials on every call.

use crate::controller::ApiResponse;
use crate::params::integration::{CredentialsParams, SendParams, TokenParams, TokenResponse};
use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use domain::credentials::Credentials;
use domain::error::Error as DomainError;
use domain::provider::Provider;
use log::*;

/// POST test a provider's credentials
#[utoipa::path(
    post,
    path = "/api/integrations/test/{provider}",
    params(("provider" = String, Path, description = "Integration identifier, e.g. `slack`")),
    request_body = CredentialsParams,
    responses(
        (status = 200, description = "Credentials accepted; `data` holds the provider's answer"),
        (status = 400, description = "Unknown integration or missing credential field"),
        (status = 502, description = "Provider rejected the credentials or could not be reached"),
    )
)]
pub async fn test(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Json(params): Json<CredentialsParams>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = provider.parse()?;
    debug!("Testing {provider} credentials: {:?}", params.credentials);

    let credentials = Credentials::from_bag(provider, params.credentials);
    let response = app_state
        .integrations
        .gateway()
        .test_connection(&credentials)
        .await?;

    Ok(Json(response))
}

/// POST send a message through a provider
#[utoipa::path(
    post,
    path = "/api/integrations/send/{provider}",
    params(("provider" = String, Path, description = "`slack`, `notion` or `discord`")),
    request_body = SendParams,
    responses(
        (status = 200, description = "Message delivered; `data` holds the provider's answer"),
        (status = 400, description = "Unknown or unsupported integration, or missing field"),
        (status = 502, description = "Provider rejected the message or could not be reached"),
    )
)]
pub async fn send(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Json(params): Json<SendParams>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = provider.parse()?;
    let (bag, payload) = params.into_parts();
    debug!("Sending through {provider} with credentials: {bag:?}");

    let credentials = Credentials::from_bag(provider, bag);
    let response = app_state
        .integrations
        .gateway()
        .send_message(&credentials, &payload)
        .await?;

    Ok(Json(response))
}

/// POST exchange an OAuth authorization code for credentials
#[utoipa::path(
    post,
    path = "/api/integrations/oauth/token",
    request_body = TokenParams,
    responses(
        (status = 200, description = "Code exchanged", body = TokenResponse),
        (status = 400, description = "Unknown or unsupported integration, or missing code"),
        (status = 500, description = "Client id or secret not configured"),
        (status = 502, description = "Provider rejected the code or could not be reached"),
    )
)]
pub async fn exchange_token(
    State(app_state): State<AppState>,
    Json(params): Json<TokenParams>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = params.integration_id.parse()?;
    let redirect_uri = params
        .redirect_uri
        .as_deref()
        .filter(|uri| !uri.trim().is_empty())
        .ok_or_else(|| DomainError::validation("No redirect URI provided"))?;

    let credentials = app_state
        .integrations
        .exchanger()
        .exchange_code(provider, &params.code, redirect_uri)
        .await?;
    info!("Exchanged {provider} authorization code");

    Ok(Json(ApiResponse::ok(TokenResponse {
        credentials: credentials.into_bag(),
    })))
}
