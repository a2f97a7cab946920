//! Infrastructure layer providing external service integrations.
//!
//! This module contains the HTTP transport, the background request
//! dispatcher, configuration loading, host detection and logging setup.

pub mod clipboard;
pub mod config;
pub mod dispatcher;
pub mod host;
pub mod logging;
pub mod transport;

pub use config::{ConfigError, Settings};
pub use dispatcher::Dispatcher;
pub use transport::*;
