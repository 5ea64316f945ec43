//! Helpers for reading provider responses.

/// Extract the provider's own error string from an error body.
///
/// Looks at `error` (string or `{message}`) then `message`, falling back to
/// the raw body and finally the status code.
pub fn provider_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = match value.get("error") {
            Some(serde_json::Value::String(error)) => Some(error.as_str()),
            Some(error) => error.get("message").and_then(|m| m.as_str()),
            None => None,
        }
        .or_else(|| value.get("message").and_then(|m| m.as_str()));

        if let Some(message) = message {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_error_string() {
        assert_eq!(
            provider_error_message(400, r#"{"error":"invalid_grant","error_description":"Bad"}"#),
            "invalid_grant"
        );
    }

    #[test]
    fn error_message_reads_nested_and_top_level_messages() {
        assert_eq!(
            provider_error_message(401, r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#),
            "Invalid Credentials"
        );
        assert_eq!(
            provider_error_message(
                400,
                r#"{"object":"error","status":400,"code":"invalid_grant","message":"Invalid code."}"#
            ),
            "Invalid code."
        );
    }

    #[test]
    fn error_message_falls_back_to_body_then_status() {
        assert_eq!(provider_error_message(502, "Bad Gateway\n"), "Bad Gateway");
        assert_eq!(provider_error_message(500, ""), "HTTP 500");
    }
}
