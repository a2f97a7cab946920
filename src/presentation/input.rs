use crate::application::App;
use crate::domain::Screen;
use crate::infrastructure::clipboard;
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('y') if app.options.debug => Self::copy_debug(app),
                _ => {}
            }
            return;
        }

        if key == KeyCode::Esc {
            app.should_quit = true;
            return;
        }

        if app.screen == Screen::Form {
            Self::handle_form(app, key);
        }
    }

    /// Terminal focus stands in for the host's visibility signal.
    pub fn handle_focus(app: &mut App, gained: bool) {
        app.set_visibility(gained);
    }

    fn handle_form(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Tab | KeyCode::Down => app.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
            KeyCode::Enter => app.activate(),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(' ') if Self::focused_is_checkbox(app) => app.toggle_focused(),
            KeyCode::Char(c) => app.type_char(c),
            _ => {}
        }
    }

    fn focused_is_checkbox(app: &App) -> bool {
        app.form.schema().fields().get(app.focus).is_some_and(|field| field.is_checkbox())
    }

    fn copy_debug(app: &mut App) {
        match clipboard::copy_text(&app.debug_snapshot()) {
            Ok(()) => app.set_message("Отладочная информация скопирована", false),
            Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
        }
    }
}
