//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer:
//! the status state machine, form submission and polling.

pub mod state;

pub use state::*;
