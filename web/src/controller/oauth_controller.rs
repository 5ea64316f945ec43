//! Controller for OAuth authorization flows.
//!
//! Note: the callback is reached through a browser redirect from the provider, so it
//! always answers with a redirect back to the frontend, never with a JSON error.

use std::time::Duration;

use crate::params::oauth::{AuthorizeParams, CallbackParams, CompletionParams};
use crate::{AppState, Error};

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::Json;

use domain::error::Error as DomainError;
use domain::provider::Provider;
use log::*;

/// GET an authorize URL for a provider
#[utoipa::path(
    get,
    path = "/api/integrations/{provider}/authorize",
    params(
        ("provider" = String, Path, description = "Integration identifier"),
        AuthorizeParams,
    ),
    responses(
        (status = 200, description = "Authorize URL and the signed `state` it carries"),
        (status = 400, description = "Unknown integration, or missing user ID or origin"),
        (status = 500, description = "Client id not configured"),
    )
)]
pub async fn authorize(
    State(app_state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<AuthorizeParams>,
) -> Result<impl IntoResponse, Error> {
    let provider: Provider = provider.parse()?;
    let authorize_url =
        app_state
            .integrations
            .generate_oauth_url(provider, &params.user_id, &params.origin)?;

    Ok(Json(authorize_url))
}

/// GET the provider's redirect back after authorization
#[utoipa::path(
    get,
    path = "/integrations/callback",
    params(CallbackParams),
    responses(
        (status = 307, description = "Redirect to `{frontend}/integrations` with the outcome in the query"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    let query = match finish_callback(&app_state, params).await {
        Ok(query) => query,
        Err(e) => {
            warn!("OAuth callback failed: {e}");
            format!("status=failed&error={}", urlencoding::encode(&e.to_string()))
        }
    };

    Redirect::temporary(&format!(
        "{}/integrations?{query}",
        app_state.config().frontend_base_url()
    ))
}

/// Settle the flow and return the query string for the frontend redirect.
async fn finish_callback(
    app_state: &AppState,
    params: CallbackParams,
) -> Result<String, DomainError> {
    let integrations = &app_state.integrations;

    if let Some(reason) = params.error {
        let provider = params
            .state
            .as_deref()
            .and_then(|state| integrations.fail_oauth_callback(state, &reason).ok());
        let error = urlencoding::encode(&reason);
        return Ok(match provider {
            Some(provider) => format!("integration={provider}&status=failed&error={error}"),
            None => format!("status=failed&error={error}"),
        });
    }

    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| DomainError::validation("No authorization code provided"))?;
    let state = params
        .state
        .filter(|state| !state.is_empty())
        .ok_or_else(|| DomainError::validation("No OAuth state provided"))?;

    let outcome = integrations
        .handle_oauth_callback(&code, &state, None)
        .await?;
    let status = if outcome.success { "connected" } else { "error" };

    Ok(format!("integration={}&status={status}", outcome.provider))
}

/// GET how the OAuth flow for a `state` ended
#[utoipa::path(
    get,
    path = "/api/integrations/oauth/completion",
    params(CompletionParams),
    responses(
        (status = 200, description = "`{status: pending}`, `{status: completed, provider, success}`, `{status: failed, reason}` or `{status: expired}` for a state that is unknown or past its TTL"),
        (status = 400, description = "Missing state"),
    )
)]
pub async fn completion(
    State(app_state): State<AppState>,
    Query(params): Query<CompletionParams>,
) -> Result<impl IntoResponse, Error> {
    if params.state.is_empty() {
        return Err(DomainError::validation("No OAuth state provided").into());
    }

    let completions = app_state.integrations.completions();
    let completion = match params.wait_secs() {
        0 => completions.get(&params.state),
        wait_secs => {
            completions
                .await_completion(&params.state, Duration::from_secs(wait_secs))
                .await
        }
    };

    Ok(Json(completion))
}
