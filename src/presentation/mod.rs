//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the active screen with ratatui and translates key
//! presses and terminal focus changes into application operations.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
