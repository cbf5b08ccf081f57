// Error classification
//
// Maps a failed request into one stable user-facing message. The source
// of truth for what failed is the closed `RequestError` type; the server
// body is parsed as structured JSON, never matched against library error
// strings. The resulting message is the only error information retained.

use serde::Deserialize;
use serde_json::Value;

use crate::error::RequestError;

const MSG_TIMEOUT: &str = "Request timed out. Please check your connection.";
const MSG_NETWORK: &str = "Unable to connect to server. Please check your network.";
const MSG_CONNECTION: &str = "Connection error. Please try again.";

/// Which operation the failed request belonged to. Parameterizes the
/// status table so login, registration, and the resource fetches share
/// one classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Registration,
    Profile,
    Products,
    Orders,
}

impl Operation {
    /// Fallback for statuses with no dedicated mapping.
    fn failed_message(self) -> &'static str {
        match self {
            Operation::Login => "Login failed. Please try again.",
            Operation::Registration => "Registration failed. Please try again.",
            Operation::Profile => "Unable to load profile. Please try again.",
            Operation::Products => "Unable to load products. Pull down to retry.",
            Operation::Orders => "Unable to load orders",
        }
    }
}

/// Error envelope the API uses for non-success responses. `errors` is
/// the Laravel-style field map: `{ "email": ["taken"], ... }`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<serde_json::Map<String, Value>>,
}

/// Classify a failed request into a user-presentable message.
///
/// Total over all inputs: never panics, never returns an empty string.
pub fn classify(op: Operation, err: &RequestError) -> String {
    match err {
        RequestError::Timeout => MSG_TIMEOUT.to_string(),
        RequestError::NetworkUnreachable => MSG_NETWORK.to_string(),
        RequestError::Transport(_) | RequestError::Storage(_) => MSG_CONNECTION.to_string(),
        RequestError::Http { status, body } => classify_http(op, *status, body),
    }
}

fn classify_http(op: Operation, status: u16, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let server_message = parsed
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    match status {
        401 => server_message.unwrap_or_else(|| "Invalid email or password".to_string()),

        403 => {
            if let Some(ref message) = server_message {
                let lower = message.to_lowercase();
                if lower.contains("pending") {
                    return "Account pending approval".to_string();
                }
                if lower.contains("rejected") || lower.contains("blocked") {
                    return "Account blocked or rejected".to_string();
                }
            }
            server_message.unwrap_or_else(|| "Access denied".to_string())
        }

        409 if op == Operation::Registration => {
            "An account with this email already exists.".to_string()
        }

        422 => first_field_error(parsed.errors.as_ref())
            .or(server_message)
            .unwrap_or_else(|| match op {
                Operation::Registration => {
                    "Please check your information and try again.".to_string()
                }
                _ => "Invalid credentials".to_string(),
            }),

        429 => "Too many attempts. Please wait a moment and try again.".to_string(),

        500 => "Server error. Please try again later.".to_string(),

        503 if op == Operation::Products => "Service temporarily unavailable.".to_string(),

        _ => server_message.unwrap_or_else(|| op.failed_message().to_string()),
    }
}

/// First error message of the first field in a validation errors map.
fn first_field_error(errors: Option<&serde_json::Map<String, Value>>) -> Option<String> {
    let (_, value) = errors?.iter().next()?;
    let message = match value {
        Value::String(message) => Some(message.as_str()),
        Value::Array(messages) => messages.first().and_then(Value::as_str),
        _ => None,
    };
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn http(status: u16, body: &str) -> RequestError {
        RequestError::Http {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_no_response_failures() {
        assert_eq!(classify(Operation::Login, &RequestError::Timeout), MSG_TIMEOUT);
        assert_eq!(
            classify(Operation::Products, &RequestError::NetworkUnreachable),
            MSG_NETWORK
        );
        assert_eq!(
            classify(Operation::Orders, &RequestError::Transport("boom".to_string())),
            MSG_CONNECTION
        );
    }

    #[test]
    fn test_401_prefers_server_message() {
        assert_eq!(
            classify(Operation::Login, &http(401, r#"{"message":"Session expired"}"#)),
            "Session expired"
        );
        assert_eq!(
            classify(Operation::Login, &http(401, "")),
            "Invalid email or password"
        );
    }

    #[test]
    fn test_403_account_state_overrides() {
        assert_eq!(
            classify(
                Operation::Login,
                &http(403, r#"{"message":"Account pending approval"}"#)
            ),
            "Account pending approval"
        );
        assert_eq!(
            classify(
                Operation::Login,
                &http(403, r#"{"message":"Your account was rejected by an admin"}"#)
            ),
            "Account blocked or rejected"
        );
        assert_eq!(
            classify(Operation::Login, &http(403, r#"{"message":"account blocked"}"#)),
            "Account blocked or rejected"
        );
        assert_eq!(classify(Operation::Login, &http(403, "{}")), "Access denied");
        assert_eq!(
            classify(Operation::Login, &http(403, r#"{"message":"Forbidden zone"}"#)),
            "Forbidden zone"
        );
    }

    #[test]
    fn test_409_registration_only() {
        assert_eq!(
            classify(Operation::Registration, &http(409, "{}")),
            "An account with this email already exists."
        );
        // Any other operation falls through to the generic mapping
        assert_eq!(
            classify(Operation::Login, &http(409, "{}")),
            "Login failed. Please try again."
        );
    }

    #[test]
    fn test_422_uses_first_field_error() {
        let body = r#"{"message":"The given data was invalid.","errors":{"email":["The email has already been taken."]}}"#;
        assert_eq!(
            classify(Operation::Registration, &http(422, body)),
            "The email has already been taken."
        );

        // Bare string values also work
        let body = r#"{"errors":{"password":"Too short"}}"#;
        assert_eq!(classify(Operation::Login, &http(422, body)), "Too short");
    }

    #[test]
    fn test_422_defaults_per_operation() {
        assert_eq!(classify(Operation::Login, &http(422, "")), "Invalid credentials");
        assert_eq!(
            classify(Operation::Registration, &http(422, "")),
            "Please check your information and try again."
        );
    }

    #[test]
    fn test_429_and_500() {
        assert_eq!(
            classify(Operation::Login, &http(429, "")),
            "Too many attempts. Please wait a moment and try again."
        );
        assert_eq!(
            classify(Operation::Products, &http(500, "")),
            "Server error. Please try again later."
        );
    }

    #[test]
    fn test_503_product_fetch_only() {
        assert_eq!(
            classify(Operation::Products, &http(503, "")),
            "Service temporarily unavailable."
        );
        assert_eq!(
            classify(Operation::Orders, &http(503, "")),
            "Unable to load orders"
        );
    }

    #[test]
    fn test_unmapped_status_fallback() {
        assert_eq!(
            classify(Operation::Orders, &http(418, "")),
            "Unable to load orders"
        );
        assert_eq!(
            classify(Operation::Profile, &http(404, r#"{"message":"No such user"}"#)),
            "No such user"
        );
    }

    #[test]
    fn test_malformed_body_is_tolerated() {
        assert_eq!(
            classify(Operation::Login, &http(401, "<html>502 bad gateway</html>")),
            "Invalid email or password"
        );
    }

    proptest! {
        // Totality: any status, any body, any operation yields a
        // non-empty message without panicking.
        #[test]
        fn classify_never_returns_empty(status in 100u16..=999, body in ".{0,200}") {
            for op in [
                Operation::Login,
                Operation::Registration,
                Operation::Profile,
                Operation::Products,
                Operation::Orders,
            ] {
                let message = classify(op, &http(status, &body));
                prop_assert!(!message.is_empty());
            }
        }
    }
}
