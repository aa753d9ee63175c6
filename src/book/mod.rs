use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use log::error;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub type Result<T> = std::result::Result<T, Error>;

pub type Repository = std::sync::Arc<dyn repository::BookRepository + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id(pub String);

impl Id {
    pub fn oid(&self) -> Result<mongodb::bson::oid::ObjectId> {
        mongodb::bson::oid::ObjectId::parse_str(&self.0).map_err(Error::from)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "Like New")]
    LikeNew,
    Good,
    Fair,
    Poor,
}

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/books", get(handler::find_all))
        .route("/books", post(handler::create))
        .route("/books/mine", get(handler::find_mine))
        .route("/books/{id}", get(handler::find_one))
        .route("/books/{id}", delete(handler::delete))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("book not found: {0:?}")]
    NotFound(Option<Id>),
    #[error("listing id not present")]
    IdNotPresent,
    #[error("not the owner of the listing")]
    NotOwner,
    #[error("price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error(transparent)]
    _ObjectId(#[from] mongodb::bson::oid::Error),

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let (status, message) = match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::NotOwner => (StatusCode::FORBIDDEN, self.to_string()),
            Self::InvalidPrice(_) | Self::MissingField(_) | Self::_ObjectId(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::IdNotPresent | Self::_MongoDB(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_id_after_insert_is_a_server_error() {
        let response = Error::IdNotPresent.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_id_is_not_reported_as_not_found() {
        assert_ne!(
            Error::IdNotPresent.to_string(),
            Error::NotFound(None).to_string()
        );
    }
}
