//! Query parameters for the browser side of the OAuth flow.

use serde::Deserialize;
use utoipa::IntoParams;

/// Longest a completion request may block.
pub const MAX_WAIT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorizeParams {
    /// The user the integration will belong to.
    #[serde(default)]
    pub user_id: String,
    /// Frontend origin the provider redirects back to.
    #[serde(default)]
    pub origin: String,
}

/// What a provider appends to the redirect URI.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompletionParams {
    #[serde(default)]
    pub state: String,
    /// Seconds to wait for the flow to finish, capped at 30. Zero returns at once.
    pub wait_secs: Option<u64>,
}

impl CompletionParams {
    pub fn wait_secs(&self) -> u64 {
        self.wait_secs.unwrap_or(0).min(MAX_WAIT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_is_capped() {
        let params = CompletionParams {
            state: "s".to_string(),
            wait_secs: Some(600),
        };
        assert_eq!(params.wait_secs(), MAX_WAIT_SECS);
        assert_eq!(CompletionParams::default().wait_secs(), 0);
    }
}
