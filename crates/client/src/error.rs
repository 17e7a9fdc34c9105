//! Error taxonomy of the client core.

use serde::Serialize;
use serde_json::Value;
use stockpanel_core::DomainError;
use thiserror::Error;

use crate::storage::StorageError;

/// One server- or client-side complaint about a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    /// Split `"<field>: <message>"` or `"<field> <message>"` into its parts.
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let split = raw
            .split_once(": ")
            .or_else(|| raw.split_once(' '));
        match split {
            Some((field, message)) => Self {
                field: field.to_string(),
                message: message.to_string(),
            },
            None => Self {
                field: String::new(),
                message: raw.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Login rejected; rendered inline on the login form.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The API answered 401 mid-session. The session has already been torn
    /// down by the time a caller sees this.
    #[error("session expired")]
    SessionExpired,

    /// The request never completed. Retriable by the user.
    #[error("network error: {0}")]
    Network(String),

    /// Input rejected on create/update; rendered per field.
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// Any other non-success status, passed through untouched.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A login is already running; the form stays disabled until it settles.
    #[error("a login attempt is already in progress")]
    LoginInFlight,
}

impl ClientError {
    /// Map a non-success, non-401 response to the error a screen handles locally.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let (message, details) = parse_error_body(body);
        let message = message.unwrap_or_else(|| format!("request failed with status {status}"));

        match status {
            400 | 422 => {
                let fields = if details.is_empty() {
                    vec![FieldError::parse(&message)]
                } else {
                    details.iter().map(|d| FieldError::parse(d)).collect()
                };
                ClientError::Validation { message, fields }
            }
            _ => ClientError::Api { status, message },
        }
    }

    /// Whether retrying the same action may succeed without changing input.
    pub fn is_retriable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        let message = match &err {
            DomainError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };
        ClientError::Validation {
            fields: vec![FieldError::parse(&message)],
            message,
        }
    }
}

/// Pull `message` out of an API error body.
///
/// The API sends either `{"message": "..."}` or, for validation failures,
/// `{"message": ["field problem", ...]}`.
pub(crate) fn parse_error_body(body: &str) -> (Option<String>, Vec<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let body = body.trim();
        return ((!body.is_empty()).then(|| body.to_string()), Vec::new());
    };

    match value.get("message") {
        Some(Value::String(message)) => (Some(message.clone()), Vec::new()),
        Some(Value::Array(items)) => {
            let details: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect();
            let message = (!details.is_empty()).then(|| details.join("; "));
            (message, details)
        }
        _ => (
            value.get("error").and_then(Value::as_str).map(str::to_string),
            Vec::new(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_with_message_list_yields_field_errors() {
        let body = r#"{"statusCode":400,"message":["name should not be empty","price must be a number"],"error":"Bad Request"}"#;
        let ClientError::Validation { message, fields } = ClientError::from_status(400, body) else {
            panic!("expected validation error");
        };
        assert_eq!(message, "name should not be empty; price must be a number");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "name");
        assert_eq!(fields[1].message, "must be a number");
    }

    #[test]
    fn other_statuses_pass_through() {
        let err = ClientError::from_status(404, r#"{"message":"Product not found"}"#);
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Product not found");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_bodies_are_kept_verbatim() {
        let err = ClientError::from_status(502, "Bad Gateway");
        assert!(matches!(err, ClientError::Api { status: 502, ref message } if message == "Bad Gateway"));
        assert!(err.is_retriable());
    }

    #[test]
    fn domain_validation_maps_to_field_error() {
        let err: ClientError = DomainError::validation("email: required").into();
        let ClientError::Validation { fields, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[0].message, "required");
    }
}
