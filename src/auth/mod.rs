use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Cookie;
use log::error;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::user;
use crate::{Raw, Redact};

mod handler;
pub mod middleware;
pub mod service;

type Result<T> = std::result::Result<T, Error>;

pub type Service = Arc<dyn service::AuthService + Send + Sync>;

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/auth/signup", post(handler::sign_up))
        .route("/auth/login", post(handler::sign_in))
        .route("/auth/logout", get(handler::sign_out))
        .with_state(state)
}

#[derive(Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    pub sub: user::Sub,
    pub exp: usize,
    pub iat: usize,
}

/// The logged-in user, attached to every authenticated request.
#[derive(Clone)]
pub struct User {
    sub: user::Sub,
    name: String,
    email: String,
}

impl User {
    pub fn new(sub: user::Sub, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            sub,
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn sub(&self) -> &user::Sub {
        &self.sub
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Display label shown to other parties.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[derive(Deserialize, PartialEq)]
pub struct Session(String);

impl Session {
    pub const ID: &'static str = "session_id";

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl Redact for Session {}

impl Raw for Session {
    fn raw(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.redact())
    }
}

impl From<&Cookie<'_>> for Session {
    fn from(c: &Cookie<'_>) -> Self {
        Self::new(c.value())
    }
}

impl From<Session> for Cookie<'_> {
    fn from(s: Session) -> Self {
        Self::new(Session::ID, s.0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unauthorized to access the resource")]
    Unauthorized,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error(transparent)]
    _User(#[from] user::Error),

    #[error(transparent)]
    _JsonWebtoken(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    _PasswordHash(#[from] argon2::password_hash::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::InvalidCredentials => (StatusCode::FORBIDDEN, self.to_string()),
            Self::InvalidEmail(_) | Self::PasswordTooShort(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            Self::_User(e) => return e.into_response(),

            // a malformed or expired token means the session is no longer valid
            Self::_JsonWebtoken(_) => (StatusCode::UNAUTHORIZED, "session expired".to_owned()),

            Self::_PasswordHash(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, message).into_response()
    }
}
