//! tgapply - application status client
//!
//! Terminal client for a membership application flow: shows the form, submits
//! it, and follows the review status reported by a remote endpoint.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
