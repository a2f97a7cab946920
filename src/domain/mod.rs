pub mod models;
pub mod form;
pub mod protocol;
pub mod errors;

pub use models::*;
pub use form::*;
pub use protocol::*;
pub use errors::*;
