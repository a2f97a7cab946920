//! Request payloads and response interpretation for the status endpoint.

use super::errors::ApiError;
use super::form::FormAnswers;
use super::models::{is_truthy, value_to_text};
use serde_json::{Map, Value};

/// Error code the server uses when an application already exists.
pub const ALREADY_SUBMITTED: &str = "ALREADY_SUBMITTED";

/// Request discriminator sent as the `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    Status,
    Submit,
}

impl ApiAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiAction::Status => "status",
            ApiAction::Submit => "submit",
        }
    }
}

/// Loosely typed request body; values are strings, booleans or objects.
pub type ApiPayload = Map<String, Value>;

pub fn status_payload(init_data: &str) -> ApiPayload {
    let mut payload = Map::new();
    payload.insert("action".to_string(), Value::from(ApiAction::Status.as_str()));
    payload.insert("initData".to_string(), Value::from(init_data));
    payload
}

pub fn submit_payload(init_data: &str, answers: FormAnswers) -> ApiPayload {
    let mut payload = Map::new();
    payload.insert("action".to_string(), Value::from(ApiAction::Submit.as_str()));
    payload.insert("initData".to_string(), Value::from(init_data));
    payload.insert("answers".to_string(), Value::Object(answers));
    payload
}

/// Flattens a payload into form-encoded key/value pairs.
///
/// Strings pass through, scalars use their JSON spelling and objects or
/// arrays are JSON-stringified.
///
/// # Examples
///
/// ```
/// use serde_json::{json, Map};
/// use tgapply::domain::encode_form_pairs;
///
/// let mut payload = Map::new();
/// payload.insert("action".into(), json!("submit"));
/// payload.insert("answers".into(), json!({"with_cam": true}));
/// let pairs = encode_form_pairs(&payload);
/// assert!(pairs.contains(&("answers".to_string(), r#"{"with_cam":true}"#.to_string())));
/// ```
pub fn encode_form_pairs(payload: &ApiPayload) -> Vec<(String, String)> {
    payload
        .iter()
        .map(|(key, value)| (key.clone(), value_to_text(value)))
        .collect()
}

/// A call the core wants made, tagged so its reply can be matched up.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Issue order; later requests have larger numbers.
    pub seq: u64,
    pub action: ApiAction,
    /// Refresh triggered by the poll timer or a visibility change.
    pub background: bool,
    pub payload: ApiPayload,
}

impl ApiRequest {
    pub fn respond(&self, result: Result<Value, ApiError>) -> ApiResponse {
        ApiResponse {
            seq: self.seq,
            action: self.action,
            background: self.background,
            result,
        }
    }
}

/// Outcome of an [`ApiRequest`], delivered back to the core.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub seq: u64,
    pub action: ApiAction,
    pub background: bool,
    pub result: Result<Value, ApiError>,
}

/// What a `submit` response asks the client to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// `ok` was truthy.
    Accepted,
    /// The server already has an application for this user.
    AlreadySubmitted,
    /// Any other error; carries the raw error text.
    Rejected(String),
    /// Neither `ok` nor `error` present.
    Unspecified,
}

impl SubmitOutcome {
    pub fn from_response(response: &Value) -> Self {
        if is_truthy(response.get("ok")) {
            return SubmitOutcome::Accepted;
        }
        match response.get("error") {
            Some(Value::String(code)) if code == ALREADY_SUBMITTED => {
                SubmitOutcome::AlreadySubmitted
            }
            error if is_truthy(error) => {
                SubmitOutcome::Rejected(error.map(value_to_text).unwrap_or_default())
            }
            _ => SubmitOutcome::Unspecified,
        }
    }
}
