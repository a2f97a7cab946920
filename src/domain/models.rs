use serde_json::Value;

/// Review status of the user's application as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationStatus {
    /// No application on file; the form is shown.
    #[default]
    None,
    /// Submitted and waiting for review.
    Pending,
    /// Accepted. Terminal.
    Approved,
}

impl ApplicationStatus {
    /// Normalizes a raw `status` field from a server response.
    ///
    /// Anything other than the exact strings `"PENDING"` or `"APPROVED"`
    /// (missing, null, numbers, unknown codes) maps to [`ApplicationStatus::None`].
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use tgapply::domain::ApplicationStatus;
    ///
    /// let status = ApplicationStatus::from_raw(Some(&json!("PENDING")));
    /// assert_eq!(status, ApplicationStatus::Pending);
    /// assert_eq!(ApplicationStatus::from_raw(Some(&json!("REJECTED"))), ApplicationStatus::None);
    /// assert_eq!(ApplicationStatus::from_raw(None), ApplicationStatus::None);
    /// ```
    pub fn from_raw(raw: Option<&Value>) -> Self {
        match raw.and_then(Value::as_str) {
            Some("PENDING") => ApplicationStatus::Pending,
            Some("APPROVED") => ApplicationStatus::Approved,
            _ => ApplicationStatus::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::None => "NONE",
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Approved => "APPROVED",
        }
    }
}

/// The screen the view layer should currently display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    /// Shown when the app is not running inside its host environment.
    HostRequired,
    Form,
    Pending,
    Approved,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Loading => "loading",
            Screen::HostRequired => "host-required",
            Screen::Form => "form",
            Screen::Pending => "pending",
            Screen::Approved => "approved",
        }
    }
}

/// A line of feedback shown under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// The identity token and host presence, read once at startup.
///
/// `embedded` tells whether the process runs inside its host at all; the
/// token may still be blank when it does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnvironment {
    pub embedded: bool,
    pub init_data: Option<String>,
}

impl HostEnvironment {
    pub fn new(embedded: bool, init_data: Option<String>) -> Self {
        let init_data = init_data.filter(|token| !token.is_empty());
        Self { embedded, init_data }
    }

    /// Running inside the host with a usable token.
    pub fn is_available(&self) -> bool {
        self.embedded && self.init_data.is_some()
    }

    pub fn has_token(&self) -> bool {
        self.init_data.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.init_data.as_deref()
    }
}

/// JavaScript-style truthiness for loosely typed server fields.
///
/// `null`, `false`, `0` and `""` are falsy; everything else, including empty
/// arrays and objects, is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Renders a JSON value the way it would read as plain text: strings
/// without quotes, everything else as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
