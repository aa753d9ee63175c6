use std::fmt::Display;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::error;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub type Result<T> = std::result::Result<T, Error>;

pub type Repository = Arc<dyn repository::UserRepository + Send + Sync>;
pub type Service = Arc<dyn service::UserService + Send + Sync>;

/// Stable unique identifier of a user, assigned at sign-up and never reused.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Sub(pub String);

impl Sub {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Sub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Sub {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Sub {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Sub, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Sub)
    }
}

impl From<&Sub> for mongodb::bson::Bson {
    fn from(sub: &Sub) -> Self {
        mongodb::bson::Bson::String(sub.0.clone())
    }
}

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/users/{sub}", get(handler::find_one))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("user not found: {0}")]
    NotFound(Sub),
    #[error("user already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let (status, message) = match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::AlreadyExists(_) => (StatusCode::CONFLICT, self.to_string()),
            Self::_MongoDB(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, message).into_response()
    }
}
