use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::Router;
use log::error;

use crate::state::AppState;
use crate::{conversation, user};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub type Result<T> = std::result::Result<T, Error>;

pub type Repository = std::sync::Arc<dyn repository::MessageRepository + Send + Sync>;

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/messages", post(handler::send))
        .route("/messages", get(handler::find_all))
        .route("/ws/messages/{conversation_id}", any(handler::subscribe))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("message text is empty")]
    EmptyText,
    #[error("message id not present")]
    IdNotPresent,

    #[error(transparent)]
    _Conversation(#[from] conversation::Error),

    #[error(transparent)]
    _User(#[from] user::Error),

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::EmptyText => (StatusCode::BAD_REQUEST, self.to_string()),

            Self::_Conversation(e) => return e.into_response(),
            Self::_User(e) => return e.into_response(),

            Self::IdNotPresent | Self::_MongoDB(_) => {
                error!("{self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, message).into_response()
    }
}
