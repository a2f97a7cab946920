//! Identity token and host presence.
//!
//! The launcher that embeds the client passes the user's signed init data in
//! `TGAPPLY_INIT_DATA`. The variable being absent means the client was started
//! outside its host; present but blank means the host gave no token.

use crate::domain::HostEnvironment;

pub const ENV_INIT_DATA: &str = "TGAPPLY_INIT_DATA";

pub fn detect() -> HostEnvironment {
    detect_with(|key| std::env::var(key).ok())
}

pub fn detect_with<F>(lookup: F) -> HostEnvironment
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(ENV_INIT_DATA) {
        Some(token) => HostEnvironment::new(true, Some(token.trim().to_string())),
        None => HostEnvironment::new(false, None),
    }
}
