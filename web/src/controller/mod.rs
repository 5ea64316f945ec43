use serde::Serialize;
pub(crate) mod health_check_controller;
pub(crate) mod integration_controller;
pub(crate) mod oauth_controller;
pub(crate) mod proxy_controller;

/// Success envelope: `{ "success": true, ...data }`.
#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
