//! Application state for the status widget.
//!
//! [`App`] owns everything the view needs: the active screen, the status
//! line, the form and the submit button state. It never touches the network
//! itself. Calls it wants made are queued as [`ApiRequest`]s and taken by the
//! event loop with [`App::take_requests`]; replies are fed back through
//! [`App::handle_response`]. Time enters through [`App::tick`].

use crate::domain::{
    normalize_error_text, status_payload, submit_payload, ApiAction, ApiPayload, ApiRequest,
    ApiResponse, ApplicationStatus, FieldKind, FormState, HostEnvironment, Screen, StatusLine,
    SubmitOutcome,
};
use serde_json::Value;
use std::time::{Duration, Instant};

pub const HOST_REQUIRED_TEXT: &str = "Открой внутри Telegram";
pub const STATUS_FAILED_TEXT: &str = "Не удалось получить статус";
pub const SUBMIT_FAILED_TEXT: &str = "Не удалось отправить заявку";
pub const SUBMIT_LABEL: &str = "Отправить заявку";
pub const SUBMITTING_LABEL: &str = "Отправляем...";

/// Interval between status refreshes while an application is pending.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Longest delay a poll timer is armed with; longer intervals are cut to it.
pub const MAX_POLL_DELAY: Duration = Duration::from_secs(86_400);

/// Repeating deadline that drives status refreshes while pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimer {
    pub next_due: Instant,
    pub interval: Duration,
}

fn next_deadline(now: Instant, interval: Duration) -> Instant {
    now.checked_add(interval.min(MAX_POLL_DELAY)).unwrap_or(now)
}

/// What the client knows about the application and the last exchange.
///
/// `polling` is `Some` exactly when `status` is `Pending`.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub polling: Option<PollTimer>,
    /// `None` until the first status has been applied.
    pub status: Option<ApplicationStatus>,
    /// Last raw reply from the server.
    pub last_status: Option<Value>,
    /// Last user-facing error text.
    pub last_error: Option<String>,
    /// Untranslated text behind `last_error`.
    pub last_error_detail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub poll_interval: Duration,
    pub keep_pending_on_poll_error: bool,
    pub debug: bool,
    /// Only used for the debug panel.
    pub api_url: Option<String>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            keep_pending_on_poll_error: false,
            debug: false,
            api_url: None,
        }
    }
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use tgapply::application::{App, AppOptions, HOST_REQUIRED_TEXT};
/// use tgapply::domain::{FormState, HostEnvironment, Screen};
///
/// let mut app = App::new(HostEnvironment::default(), FormState::default(), AppOptions::default());
/// app.start();
/// assert_eq!(app.screen, Screen::HostRequired);
/// assert_eq!(app.message.as_ref().unwrap().text, HOST_REQUIRED_TEXT);
/// assert!(app.take_requests().is_empty());
/// ```
#[derive(Debug)]
pub struct App {
    pub host: HostEnvironment,
    pub form: FormState,
    pub session: SessionState,
    pub screen: Screen,
    pub message: Option<StatusLine>,
    /// A submit call is in flight.
    pub submitting: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    /// Whether the user can currently see the client.
    pub visible: bool,
    /// Focused form element; `form.schema().len()` is the submit button.
    pub focus: usize,
    pub options: AppOptions,
    pub should_quit: bool,
    next_seq: u64,
    last_applied_seq: u64,
    outbox: Vec<ApiRequest>,
    now: Instant,
}

impl App {
    pub fn new(host: HostEnvironment, form: FormState, options: AppOptions) -> Self {
        Self {
            host,
            form,
            session: SessionState::default(),
            screen: Screen::Loading,
            message: None,
            submitting: false,
            submit_enabled: false,
            submit_label: SUBMIT_LABEL,
            visible: true,
            focus: 0,
            options,
            should_quit: false,
            next_seq: 0,
            last_applied_seq: 0,
            outbox: Vec::new(),
            now: Instant::now(),
        }
    }

    /// Evaluates the submit button and asks for the initial status.
    pub fn start(&mut self) {
        tracing::info!(
            embedded = self.host.embedded,
            has_token = self.host.has_token(),
            "starting"
        );
        self.sync_submit_state();
        self.check_status(true);
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn status(&self) -> Option<ApplicationStatus> {
        self.session.status
    }

    /// Requests queued since the last call, oldest first.
    pub fn take_requests(&mut self) -> Vec<ApiRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn show_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            tracing::debug!(from = self.screen.name(), to = screen.name(), "screen");
        }
        self.screen = screen;
    }

    pub fn set_message(&mut self, text: impl Into<String>, is_error: bool) {
        let text = text.into();
        self.message = if text.is_empty() { None } else { Some(StatusLine { text, is_error }) };
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Enabled iff the form is complete, a token exists and nothing is in flight.
    pub fn sync_submit_state(&mut self) {
        self.submit_enabled = self.form.is_complete() && self.host.has_token() && !self.submitting;
    }

    fn show_host_required(&mut self) {
        self.show_screen(Screen::HostRequired);
        self.set_message(HOST_REQUIRED_TEXT, true);
    }

    fn issue(&mut self, action: ApiAction, background: bool, payload: ApiPayload) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        tracing::debug!(seq, action = action.as_str(), background, "request queued");
        self.outbox.push(ApiRequest { seq, action, background, payload });
        seq
    }

    /// Applies a raw `status` value from the server.
    pub fn apply_status(&mut self, raw: Option<&Value>) {
        self.set_status(ApplicationStatus::from_raw(raw));
    }

    fn set_status(&mut self, status: ApplicationStatus) {
        if self.session.status != Some(status) {
            tracing::info!(status = status.as_str(), "application status");
        }
        self.session.status = Some(status);
        match status {
            ApplicationStatus::Approved => {
                self.session.polling = None;
                self.show_screen(Screen::Approved);
            }
            ApplicationStatus::Pending => {
                self.show_screen(Screen::Pending);
                if self.session.polling.is_none() {
                    let interval = self.options.poll_interval;
                    let next_due = next_deadline(self.now, interval);
                    self.session.polling = Some(PollTimer { next_due, interval });
                }
            }
            ApplicationStatus::None => {
                self.session.polling = None;
                self.show_screen(Screen::Form);
            }
        }
    }

    /// Asks the server for the current status.
    ///
    /// With `from_load` the loading screen is shown while waiting.
    pub fn check_status(&mut self, from_load: bool) {
        self.refresh(from_load, false);
    }

    fn refresh(&mut self, from_load: bool, background: bool) {
        if !self.host.is_available() {
            self.show_host_required();
            return;
        }
        let token = self.host.token().unwrap_or_default();
        let payload = status_payload(token);
        if from_load {
            self.show_screen(Screen::Loading);
        }
        self.clear_message();
        self.issue(ApiAction::Status, background, payload);
    }

    /// Advances the clock and fires the poll timer when due.
    ///
    /// A due timer while the client is hidden re-arms without refreshing.
    pub fn tick(&mut self, now: Instant) {
        self.now = now;
        let Some(timer) = self.session.polling.as_mut() else {
            return;
        };
        if now < timer.next_due {
            return;
        }
        timer.next_due = next_deadline(now, timer.interval);
        if self.visible {
            self.refresh(false, true);
        }
    }

    /// Records a visibility change; becoming visible while pending refreshes at once.
    pub fn set_visibility(&mut self, visible: bool) {
        let became_visible = visible && !self.visible;
        self.visible = visible;
        if became_visible && self.session.status == Some(ApplicationStatus::Pending) {
            self.refresh(false, true);
        }
    }

    /// Sends the form if the submit button is enabled and nothing is in flight.
    pub fn submit_application(&mut self) {
        if !self.submit_enabled || self.submitting {
            return;
        }
        if !self.host.is_available() {
            self.show_host_required();
            return;
        }
        let token = self.host.token().unwrap_or_default();
        let payload = submit_payload(token, self.form.answers());

        self.submitting = true;
        self.sync_submit_state();
        self.submit_label = SUBMITTING_LABEL;
        self.clear_message();
        self.issue(ApiAction::Submit, false, payload);
    }

    pub fn handle_response(&mut self, response: ApiResponse) {
        match response.action {
            ApiAction::Status => self.on_status_response(response),
            ApiAction::Submit => self.on_submit_response(response),
        }
    }

    fn on_status_response(&mut self, response: ApiResponse) {
        if response.seq < self.last_applied_seq {
            tracing::debug!(
                seq = response.seq,
                newest = self.last_applied_seq,
                "dropping stale status reply"
            );
            return;
        }
        self.last_applied_seq = response.seq;

        match response.result {
            Ok(data) => {
                self.session.last_error = None;
                self.session.last_error_detail = None;
                let raw = data.get("status").cloned();
                self.session.last_status = Some(data);
                self.apply_status(raw.as_ref());
            }
            Err(err) => {
                tracing::warn!(error = %err, detail = %err.detail(), "status check failed");
                self.session.last_error = Some(err.user_message());
                self.session.last_error_detail = Some(err.detail());
                self.set_message(STATUS_FAILED_TEXT, true);
                let keep = response.background
                    && self.options.keep_pending_on_poll_error
                    && self.session.status == Some(ApplicationStatus::Pending);
                if !keep {
                    self.set_status(ApplicationStatus::None);
                }
            }
        }
        self.sync_submit_state();
    }

    fn on_submit_response(&mut self, response: ApiResponse) {
        self.last_applied_seq = self.last_applied_seq.max(response.seq);
        let mut recheck = false;

        match response.result {
            Ok(data) => {
                self.session.last_error = None;
                self.session.last_error_detail = None;
                let outcome = SubmitOutcome::from_response(&data);
                self.session.last_status = Some(data);
                tracing::info!(?outcome, "submit answered");
                match outcome {
                    SubmitOutcome::Accepted | SubmitOutcome::Unspecified => {
                        self.set_status(ApplicationStatus::Pending);
                    }
                    SubmitOutcome::AlreadySubmitted => recheck = true,
                    SubmitOutcome::Rejected(raw) => {
                        let text = normalize_error_text(&raw);
                        self.session.last_error = Some(text.clone());
                        self.session.last_error_detail = Some(raw);
                        self.set_message(text, true);
                        self.set_status(ApplicationStatus::None);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, detail = %err.detail(), "submit failed");
                self.session.last_error = Some(err.user_message());
                self.session.last_error_detail = Some(err.detail());
                self.set_message(SUBMIT_FAILED_TEXT, true);
                self.set_status(ApplicationStatus::None);
            }
        }

        self.submitting = false;
        self.submit_label = SUBMIT_LABEL;
        self.sync_submit_state();
        if recheck {
            self.check_status(false);
        }
    }

    pub fn submit_index(&self) -> usize {
        self.form.schema().len()
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % (self.submit_index() + 1);
    }

    pub fn focus_prev(&mut self) {
        let count = self.submit_index() + 1;
        self.focus = (self.focus + count - 1) % count;
    }

    pub fn type_char(&mut self, ch: char) {
        if self.form.push_char(self.focus, ch) {
            self.sync_submit_state();
        }
    }

    pub fn backspace(&mut self) {
        if self.form.pop_char(self.focus) {
            self.sync_submit_state();
        }
    }

    pub fn toggle_focused(&mut self) {
        if self.form.toggle(self.focus) {
            self.sync_submit_state();
        }
    }

    /// Enter on the focused element: submit, toggle, newline or next field.
    pub fn activate(&mut self) {
        if self.focus == self.submit_index() {
            self.submit_application();
            return;
        }
        match self.form.schema().fields()[self.focus].kind {
            FieldKind::Checkbox => self.toggle_focused(),
            FieldKind::Multiline => self.type_char('\n'),
            FieldKind::Text => self.focus_next(),
        }
    }

    /// Label/value pairs for the debug panel.
    pub fn debug_lines(&self) -> Vec<(&'static str, String)> {
        let dash = || "—".to_string();
        vec![
            ("host", self.host.embedded.to_string()),
            ("initData length", self.host.token().map_or(0, |t| t.len()).to_string()),
            ("API URL", self.options.api_url.clone().unwrap_or_else(dash)),
            ("lastStatus", self.session.last_status.as_ref().map_or_else(dash, |v| v.to_string())),
            ("lastError", self.session.last_error.clone().unwrap_or_else(dash)),
            ("lastErrorDetail", self.session.last_error_detail.clone().unwrap_or_else(dash)),
        ]
    }

    pub fn debug_snapshot(&self) -> String {
        self.debug_lines()
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiError, SERVER_ERROR_TEXT};
    use serde_json::json;

    const TOKEN: &str = "query_id=AAE&user=%7B%22id%22%3A42%7D&hash=abc";

    fn host() -> HostEnvironment {
        HostEnvironment::new(true, Some(TOKEN.to_string()))
    }

    fn app() -> App {
        App::new(host(), FormState::default(), AppOptions::default())
    }

    fn fill(app: &mut App) {
        app.form.set_text("name", "Алиса").unwrap();
        app.form.set_text("age", "19").unwrap();
        app.form.set_text("about", "Строю редстоун-фермы").unwrap();
        app.form.set_text("mc_nick", "alice_mc").unwrap();
        app.form.set_checked("with_cam", true).unwrap();
        app.sync_submit_state();
    }

    /// App showing the form, with the form filled in and no requests pending.
    fn form_app() -> App {
        let mut app = app();
        app.start();
        reply(&mut app, json!({"status": "NONE"}));
        fill(&mut app);
        app
    }

    fn reply(app: &mut App, value: Value) {
        let requests = app.take_requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        app.handle_response(requests[0].respond(Ok(value)));
    }

    fn fail(app: &mut App, err: ApiError) {
        let requests = app.take_requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        app.handle_response(requests[0].respond(Err(err)));
    }

    #[test]
    fn test_new_app_is_loading() {
        let app = app();
        assert_eq!(app.screen, Screen::Loading);
        assert!(app.status().is_none());
        assert!(!app.submit_enabled);
        assert_eq!(app.submit_label, SUBMIT_LABEL);
    }

    #[test]
    fn test_start_requests_status_with_token() {
        let mut app = app();
        app.start();
        assert_eq!(app.screen, Screen::Loading);

        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].action, ApiAction::Status);
        assert_eq!(requests[0].payload.get("action"), Some(&json!("status")));
        assert_eq!(requests[0].payload.get("initData"), Some(&json!(TOKEN)));
    }

    #[test]
    fn test_missing_token_shows_host_required_without_request() {
        let no_host = HostEnvironment::new(true, None);
        let mut app = App::new(no_host, FormState::default(), AppOptions::default());
        app.check_status(true);
        assert_eq!(app.screen, Screen::HostRequired);
        assert_eq!(
            app.message,
            Some(StatusLine { text: HOST_REQUIRED_TEXT.to_string(), is_error: true })
        );
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn test_outside_host_shows_host_required() {
        let mut app = App::new(
            HostEnvironment::new(false, Some(TOKEN.to_string())),
            FormState::default(),
            AppOptions::default(),
        );
        app.check_status(true);
        assert_eq!(app.screen, Screen::HostRequired);
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn test_unknown_status_routes_to_form() {
        for raw in [json!("REJECTED"), json!(null), json!(7), json!("")] {
            let mut app = app();
            app.apply_status(Some(&raw));
            assert_eq!(app.status(), Some(ApplicationStatus::None));
            assert_eq!(app.screen, Screen::Form);
            assert!(app.session.polling.is_none());
        }
        let mut app = app();
        app.apply_status(None);
        assert_eq!(app.screen, Screen::Form);
    }

    #[test]
    fn test_status_reply_without_status_field_shows_form() {
        let mut app = app();
        app.start();
        reply(&mut app, json!({"hello": "world"}));
        assert_eq!(app.screen, Screen::Form);
        assert_eq!(app.session.last_status, Some(json!({"hello": "world"})));
    }

    #[test]
    fn test_pending_starts_single_timer() {
        let mut app = app();
        app.apply_status(Some(&json!("PENDING")));
        let timer = app.session.polling.expect("timer");
        assert_eq!(timer.interval, DEFAULT_POLL_INTERVAL);

        // Re-applying keeps the existing timer instead of starting another.
        app.tick(app.now() + Duration::from_secs(3));
        app.apply_status(Some(&json!("PENDING")));
        assert_eq!(app.session.polling, Some(timer));
    }

    #[test]
    fn test_leaving_pending_clears_timer() {
        let mut app = app();
        app.apply_status(Some(&json!("PENDING")));
        app.apply_status(Some(&json!("NONE")));
        assert!(app.session.polling.is_none());

        app.apply_status(Some(&json!("PENDING")));
        app.apply_status(Some(&json!("APPROVED")));
        assert!(app.session.polling.is_none());
        assert_eq!(app.screen, Screen::Approved);
    }

    #[test]
    fn test_approved_is_idempotent() {
        let mut app = app();
        app.apply_status(Some(&json!("APPROVED")));
        app.apply_status(Some(&json!("APPROVED")));
        assert_eq!(app.screen, Screen::Approved);
        assert!(app.session.polling.is_none());
    }

    #[test]
    fn test_pending_poll_fires_once_per_interval() {
        let mut app = app();
        app.start();
        reply(&mut app, json!({"status": "PENDING"}));
        assert_eq!(app.screen, Screen::Pending);
        assert!(app.session.polling.is_some());

        let t0 = app.now();
        app.tick(t0 + Duration::from_secs(9));
        assert!(app.take_requests().is_empty());

        app.tick(t0 + Duration::from_secs(10));
        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].action, ApiAction::Status);
        assert!(requests[0].background);

        app.tick(t0 + Duration::from_secs(11));
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn test_huge_poll_interval_is_capped() {
        let options = AppOptions { poll_interval: Duration::MAX, ..AppOptions::default() };
        let mut app = App::new(host(), FormState::default(), options);
        app.start();
        reply(&mut app, json!({"status": "PENDING"}));
        let t0 = app.now();
        assert_eq!(app.session.polling.unwrap().next_due, t0 + MAX_POLL_DELAY);

        app.tick(t0 + MAX_POLL_DELAY);
        assert_eq!(app.take_requests().len(), 1);
        let timer = app.session.polling.unwrap();
        assert_eq!(timer.next_due, t0 + MAX_POLL_DELAY + MAX_POLL_DELAY);
        assert_eq!(timer.interval, Duration::MAX);
    }

    #[test]
    fn test_poll_skipped_while_hidden() {
        let mut app = app();
        app.apply_status(Some(&json!("PENDING")));
        app.set_visibility(false);

        let t0 = app.now();
        app.tick(t0 + Duration::from_secs(10));
        assert!(app.take_requests().is_empty());
        assert!(app.session.polling.is_some());
    }

    #[test]
    fn test_becoming_visible_while_pending_refreshes() {
        let mut app = app();
        app.apply_status(Some(&json!("PENDING")));
        app.set_visibility(false);
        app.set_visibility(true);
        assert_eq!(app.take_requests().len(), 1);

        // Already visible: no extra refresh.
        app.set_visibility(true);
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn test_becoming_visible_on_form_does_nothing() {
        let mut app = form_app();
        app.set_visibility(false);
        app.set_visibility(true);
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn test_status_failure_demotes_to_form() {
        let mut app = app();
        app.apply_status(Some(&json!("PENDING")));
        app.tick(app.now() + DEFAULT_POLL_INTERVAL);
        fail(&mut app, ApiError::transport("connection reset"));

        assert_eq!(app.status(), Some(ApplicationStatus::None));
        assert_eq!(app.screen, Screen::Form);
        assert!(app.session.polling.is_none());
        assert_eq!(app.message.as_ref().unwrap().text, STATUS_FAILED_TEXT);
        assert_eq!(app.session.last_error.as_deref(), Some("connection reset"));
        assert_eq!(app.session.last_error_detail.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_background_failure_can_keep_pending() {
        let options = AppOptions { keep_pending_on_poll_error: true, ..AppOptions::default() };
        let mut app = App::new(host(), FormState::default(), options);
        app.apply_status(Some(&json!("PENDING")));
        app.tick(app.now() + DEFAULT_POLL_INTERVAL);
        fail(&mut app, ApiError::transport("timeout"));

        assert_eq!(app.status(), Some(ApplicationStatus::Pending));
        assert_eq!(app.screen, Screen::Pending);
        assert!(app.session.polling.is_some());
        assert_eq!(app.message.as_ref().unwrap().text, STATUS_FAILED_TEXT);
    }

    #[test]
    fn test_initial_load_failure_shows_form_even_when_keeping_pending() {
        let options = AppOptions { keep_pending_on_poll_error: true, ..AppOptions::default() };
        let mut app = App::new(host(), FormState::default(), options);
        app.start();
        fail(&mut app, ApiError::NotConfigured);
        assert_eq!(app.screen, Screen::Form);
        assert_eq!(app.session.last_error.as_deref(), Some("API_URL не задан"));
    }

    #[test]
    fn test_stale_status_reply_is_dropped() {
        let mut app = app();
        app.apply_status(Some(&json!("PENDING")));
        app.tick(app.now() + DEFAULT_POLL_INTERVAL);
        app.set_visibility(false);
        app.set_visibility(true);
        let requests = app.take_requests();
        assert_eq!(requests.len(), 2);

        app.handle_response(requests[1].respond(Ok(json!({"status": "APPROVED"}))));
        app.handle_response(requests[0].respond(Ok(json!({"status": "PENDING"}))));
        assert_eq!(app.status(), Some(ApplicationStatus::Approved));
        assert_eq!(app.screen, Screen::Approved);
        assert!(app.session.polling.is_none());
    }

    #[test]
    fn test_submit_enablement_conditions() {
        let mut app = form_app();
        assert!(app.submit_enabled);

        app.form.set_text("about", "  ").unwrap();
        app.sync_submit_state();
        assert!(!app.submit_enabled);
        app.form.set_text("about", "ok").unwrap();
        app.sync_submit_state();
        assert!(app.submit_enabled);

        app.form.set_checked("with_cam", false).unwrap();
        app.sync_submit_state();
        assert!(!app.submit_enabled);
        app.form.set_checked("with_voice", true).unwrap();
        app.sync_submit_state();
        assert!(app.submit_enabled);

        app.submitting = true;
        app.sync_submit_state();
        assert!(!app.submit_enabled);
        app.submitting = false;
        app.sync_submit_state();
        assert!(app.submit_enabled);

        let host_without_token = HostEnvironment::new(true, None);
        let mut no_token =
            App::new(host_without_token, FormState::default(), AppOptions::default());
        fill(&mut no_token);
        assert!(!no_token.submit_enabled);
    }

    #[test]
    fn test_submit_sends_answers() {
        let mut app = form_app();
        app.submit_application();

        assert!(app.submitting);
        assert!(!app.submit_enabled);
        assert_eq!(app.submit_label, SUBMITTING_LABEL);

        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        let payload = &requests[0].payload;
        assert_eq!(payload.get("action"), Some(&json!("submit")));
        assert_eq!(payload.get("initData"), Some(&json!(TOKEN)));
        let answers = payload.get("answers").and_then(Value::as_object).unwrap();
        assert_eq!(answers.get("mc_nick"), Some(&json!("alice_mc")));
        assert_eq!(answers.get("with_cam"), Some(&json!(true)));
        assert_eq!(answers.get("with_voice"), Some(&json!(false)));
    }

    #[test]
    fn test_submit_is_not_reentrant() {
        let mut app = form_app();
        app.submit_application();
        app.submit_application();
        app.activate();
        assert_eq!(app.take_requests().len(), 1);
    }

    #[test]
    fn test_submit_disabled_is_noop() {
        let mut app = app();
        app.start();
        reply(&mut app, json!({"status": "NONE"}));
        app.submit_application();
        assert!(app.take_requests().is_empty());
        assert!(!app.submitting);
    }

    #[test]
    fn test_submit_ok_goes_pending() {
        let mut app = form_app();
        app.submit_application();
        reply(&mut app, json!({"ok": true}));

        assert_eq!(app.status(), Some(ApplicationStatus::Pending));
        assert_eq!(app.screen, Screen::Pending);
        assert!(app.session.polling.is_some());
        assert!(!app.submitting);
        assert_eq!(app.submit_label, SUBMIT_LABEL);
        assert!(app.message.is_none());
    }

    #[test]
    fn test_submit_without_verdict_is_optimistic() {
        let mut app = form_app();
        app.submit_application();
        reply(&mut app, json!({}));
        assert_eq!(app.screen, Screen::Pending);
        assert!(!app.submitting);
    }

    #[test]
    fn test_already_submitted_rechecks_status() {
        let mut app = form_app();
        app.submit_application();
        reply(&mut app, json!({"error": "ALREADY_SUBMITTED"}));

        assert!(app.message.is_none());
        assert!(!app.submitting);
        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].action, ApiAction::Status);

        app.handle_response(requests[0].respond(Ok(json!({"status": "APPROVED"}))));
        assert_eq!(app.screen, Screen::Approved);
    }

    #[test]
    fn test_submit_rejected_shows_error() {
        let mut app = form_app();
        app.submit_application();
        reply(&mut app, json!({"error": "  AGE_TOO_LOW "}));

        assert_eq!(app.screen, Screen::Form);
        assert_eq!(
            app.message,
            Some(StatusLine { text: "AGE_TOO_LOW".to_string(), is_error: true })
        );
        assert_eq!(app.session.last_error.as_deref(), Some("AGE_TOO_LOW"));
        assert_eq!(app.session.last_error_detail.as_deref(), Some("  AGE_TOO_LOW "));
        assert!(!app.submitting);
        assert!(app.submit_enabled);
    }

    #[test]
    fn test_submit_rejected_with_html_hides_markup() {
        let mut app = form_app();
        app.submit_application();
        reply(&mut app, json!({"error": "<html><body>Internal Server Error</body></html>"}));
        assert_eq!(app.message.as_ref().unwrap().text, SERVER_ERROR_TEXT);
    }

    #[test]
    fn test_transport_html_error_is_normalized() {
        let err = ApiError::transport("<HTML><h1>504 Gateway Time-out</h1></HTML>");
        let mut app = form_app();
        app.submit_application();
        fail(&mut app, err);
        assert_eq!(app.session.last_error.as_deref(), Some(SERVER_ERROR_TEXT));
        assert!(app.session.last_error_detail.as_deref().unwrap().contains("504"));
    }

    #[test]
    fn test_submit_network_failure_resets() {
        let mut app = form_app();
        app.submit_application();
        fail(&mut app, ApiError::transport("error sending request"));

        assert_eq!(app.status(), Some(ApplicationStatus::None));
        assert_eq!(app.screen, Screen::Form);
        assert_eq!(app.message.as_ref().unwrap().text, SUBMIT_FAILED_TEXT);
        assert!(!app.submitting);
        assert_eq!(app.submit_label, SUBMIT_LABEL);
        assert!(app.submit_enabled);
    }

    #[test]
    fn test_submit_outside_host_shows_host_required() {
        let mut app = App::new(
            HostEnvironment::new(false, Some(TOKEN.to_string())),
            FormState::default(),
            AppOptions::default(),
        );
        fill(&mut app);
        assert!(app.submit_enabled);
        app.submit_application();
        assert_eq!(app.screen, Screen::HostRequired);
        assert!(app.take_requests().is_empty());
        assert!(!app.submitting);
    }

    #[test]
    fn test_check_status_clears_message() {
        let mut app = form_app();
        app.set_message("old", true);
        app.check_status(false);
        assert!(app.message.is_none());
        assert_eq!(app.screen, Screen::Form);
    }

    #[test]
    fn test_focus_wraps_around() {
        let mut app = app();
        app.focus_prev();
        assert_eq!(app.focus, app.submit_index());
        app.focus_next();
        assert_eq!(app.focus, 0);
    }

    #[test]
    fn test_typing_updates_enablement() {
        let mut app = app();
        fill(&mut app);
        app.form.set_text("age", "").unwrap();
        app.sync_submit_state();
        assert!(!app.submit_enabled);

        app.focus = app.form.schema().index_of("age").unwrap();
        app.type_char('2');
        assert!(app.submit_enabled);
        app.backspace();
        assert!(!app.submit_enabled);
    }

    #[test]
    fn test_debug_snapshot_lists_errors() {
        let mut app = form_app();
        app.submit_application();
        fail(&mut app, ApiError::transport("dns failure"));
        let snapshot = app.debug_snapshot();
        assert!(snapshot.contains("lastErrorDetail: dns failure"));
        assert!(snapshot.contains(&format!("initData length: {}", TOKEN.len())));
        assert!(snapshot.contains("API URL: —"));
    }
}
