//! HTTP access to the application status endpoint.

use crate::domain::{
    encode_form_pairs, is_truthy, value_to_text, ApiError, ApiPayload, EMPTY_RESPONSE_TEXT,
};
use serde_json::{json, Value};
use std::time::Duration;

/// Posts a form payload to the remote endpoint and returns its JSON reply.
///
/// Implementations do not retry; polling in the state machine covers that.
pub trait ApiTransport: Send + Sync {
    fn post_api_form(&self, payload: &ApiPayload) -> Result<Value, ApiError>;
}

/// Blocking reqwest client bound to a single endpoint.
pub struct HttpTransport {
    endpoint: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let endpoint = endpoint.filter(|url| !url.trim().is_empty());
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

impl ApiTransport for HttpTransport {
    fn post_api_form(&self, payload: &ApiPayload) -> Result<Value, ApiError> {
        let endpoint = self.endpoint.as_deref().ok_or(ApiError::NotConfigured)?;
        let action = payload.get("action").map(value_to_text).unwrap_or_default();
        tracing::debug!(%action, endpoint, "posting form");

        let response = self
            .client
            .post(endpoint)
            .form(&encode_form_pairs(payload))
            .send()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        let status = response.status();
        let raw = response.text().map_err(|e| ApiError::transport(e.to_string()))?;

        tracing::debug!(%action, status = status.as_u16(), bytes = raw.len(), "response received");
        interpret_response(status.as_u16(), status.is_success(), &raw)
    }
}

/// Turns a status code and raw body into the reply value or an error.
///
/// A body that is not JSON is treated as `{"error": body}`. On a non-2xx
/// status the error text comes from the `error` field, then the raw body,
/// then the status code.
pub fn interpret_response(status: u16, success: bool, raw: &str) -> Result<Value, ApiError> {
    let data = if raw.is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(_) => Some(json!({ "error": raw })),
        }
    };

    if !success {
        let error = data
            .as_ref()
            .and_then(|value| value.get("error"))
            .filter(|error| is_truthy(Some(*error)))
            .map(value_to_text);
        let message = match error {
            Some(error) => error,
            None if !raw.is_empty() => raw.to_string(),
            None => format!("Ошибка {status}"),
        };
        return Err(ApiError::transport(message));
    }

    data.filter(|value| is_truthy(Some(value)))
        .ok_or_else(|| ApiError::transport(EMPTY_RESPONSE_TEXT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{status_payload, SERVER_ERROR_TEXT};

    #[test]
    fn test_success_returns_parsed_json() {
        let value = interpret_response(200, true, r#"{"status":"PENDING"}"#).unwrap();
        assert_eq!(value["status"], "PENDING");
    }

    #[test]
    fn test_non_json_success_body_is_wrapped() {
        let value = interpret_response(200, true, "maintenance").unwrap();
        assert_eq!(value, json!({"error": "maintenance"}));
    }

    #[test]
    fn test_empty_success_body_fails() {
        let err = interpret_response(200, true, "").unwrap_err();
        assert_eq!(err.user_message(), EMPTY_RESPONSE_TEXT);

        let err = interpret_response(200, true, "null").unwrap_err();
        assert_eq!(err.user_message(), EMPTY_RESPONSE_TEXT);
    }

    #[test]
    fn test_falsy_success_body_counts_as_empty() {
        for body in ["false", "0", r#""""#] {
            let err = interpret_response(200, true, body).unwrap_err();
            assert_eq!(err.user_message(), EMPTY_RESPONSE_TEXT, "body {body}");
        }
    }

    #[test]
    fn test_empty_object_is_a_value() {
        assert_eq!(interpret_response(200, true, "{}"), Ok(json!({})));
    }

    #[test]
    fn test_error_status_prefers_error_field() {
        let err = interpret_response(400, false, r#"{"error":"BAD_INIT_DATA"}"#).unwrap_err();
        assert_eq!(err.user_message(), "BAD_INIT_DATA");
    }

    #[test]
    fn test_error_status_falls_back_to_body_then_code() {
        let err = interpret_response(500, false, r#"{"detail":"boom"}"#).unwrap_err();
        assert_eq!(err.user_message(), r#"{"detail":"boom"}"#);

        let err = interpret_response(503, false, "").unwrap_err();
        assert_eq!(err.user_message(), "Ошибка 503");
    }

    #[test]
    fn test_html_error_page_is_hidden_from_user() {
        let page = "<html><head><title>502 Bad Gateway</title></head></html>";
        let err = interpret_response(502, false, page).unwrap_err();
        assert_eq!(err.user_message(), SERVER_ERROR_TEXT);
        assert_eq!(err.detail(), page);
    }

    #[test]
    fn test_error_status_with_json_body_is_still_failure() {
        let err = interpret_response(500, false, r#"{"ok":true}"#).unwrap_err();
        assert_eq!(err.user_message(), r#"{"ok":true}"#);
    }

    #[test]
    fn test_missing_endpoint_is_configuration_error() {
        let transport = HttpTransport::new(None, Duration::from_secs(1)).unwrap();
        let err = transport.post_api_form(&status_payload("token")).unwrap_err();
        assert_eq!(err, ApiError::NotConfigured);

        let transport = HttpTransport::new(Some("  ".to_string()), Duration::from_secs(1)).unwrap();
        assert!(transport.endpoint().is_none());
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        // Nothing listens on the discard port.
        let endpoint = Some("http://127.0.0.1:9/api".to_string());
        let transport = HttpTransport::new(endpoint, Duration::from_secs(2)).unwrap();
        let err = transport.post_api_form(&status_payload("token")).unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert!(!err.detail().is_empty());
    }
}
