use thiserror::Error;

/// Shown when the server cannot be reached or the error text is blank.
pub const UNREACHABLE_TEXT: &str = "Не удалось связаться с сервером";
/// Shown instead of an HTML error page returned by a proxy or the server.
pub const SERVER_ERROR_TEXT: &str = "Сервер вернул ошибку. Попробуйте позже.";
/// A 2xx response that carried no JSON value.
pub const EMPTY_RESPONSE_TEXT: &str = "Пустой ответ сервера";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown form field: {0}")]
    UnknownField(String),
    #[error("field {0} is not a text field")]
    NotText(String),
    #[error("field {0} is not a checkbox")]
    NotCheckbox(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Failure of a call to the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No endpoint URL is configured; no request was attempted.
    #[error("API_URL не задан")]
    NotConfigured,
    /// Network failure, non-2xx status, or an unusable body.
    ///
    /// `message` is safe to show to the user, `detail` is the text it was
    /// derived from.
    #[error("{message}")]
    Transport { message: String, detail: String },
}

impl ApiError {
    /// Builds a transport error from a raw message, normalizing it for display.
    pub fn transport(raw: impl Into<String>) -> Self {
        let detail = raw.into();
        ApiError::Transport {
            message: normalize_error_text(&detail),
            detail,
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::NotConfigured => self.to_string(),
            ApiError::Transport { detail, .. } => detail.clone(),
        }
    }
}

/// Turns a raw error message into something fit for the status line.
///
/// # Examples
///
/// ```
/// use tgapply::domain::{normalize_error_text, SERVER_ERROR_TEXT, UNREACHABLE_TEXT};
///
/// assert_eq!(normalize_error_text("  "), UNREACHABLE_TEXT);
/// assert_eq!(normalize_error_text("<HTML><body>502</body></HTML>"), SERVER_ERROR_TEXT);
/// assert_eq!(normalize_error_text(" FORM_INVALID "), "FORM_INVALID");
/// ```
pub fn normalize_error_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return UNREACHABLE_TEXT.to_string();
    }
    if trimmed.to_lowercase().contains("<html") {
        return SERVER_ERROR_TEXT.to_string();
    }
    trimmed.to_string()
}
