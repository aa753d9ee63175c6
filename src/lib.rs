pub mod auth;
pub mod book;
pub mod conversation;
pub mod error;
pub mod integration;
pub mod live;
pub mod media;
pub mod message;
pub mod state;
pub mod user;

pub type Result<T> = std::result::Result<T, error::Error>;

pub trait Raw {
    fn raw(&self) -> &str;
}

/// Masks secrets (session tokens etc.) in debug output.
pub trait Redact: Raw {
    fn redact(&self) -> String {
        let raw = self.raw();
        if raw.len() <= 8 {
            return "********".to_string();
        }
        format!("{}********", &raw[..4])
    }
}
