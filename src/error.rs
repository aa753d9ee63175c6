use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::{auth, book, conversation, integration, media, message, user};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("required query parameter: {0}")]
    QueryParamRequired(String),

    #[error(transparent)]
    _Auth(#[from] auth::Error),

    #[error(transparent)]
    _User(#[from] user::Error),

    #[error(transparent)]
    _Book(#[from] book::Error),

    #[error(transparent)]
    _Conversation(#[from] conversation::Error),

    #[error(transparent)]
    _Message(#[from] message::Error),

    #[error(transparent)]
    _Media(#[from] media::Error),

    #[error(transparent)]
    _Integration(#[from] integration::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::QueryParamRequired(_) => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }

            Self::_Auth(e) => e.into_response(),
            Self::_User(e) => e.into_response(),
            Self::_Book(e) => e.into_response(),
            Self::_Conversation(e) => e.into_response(),
            Self::_Message(e) => e.into_response(),
            Self::_Media(e) => e.into_response(),
            Self::_Integration(e) => e.into_response(),
        }
    }
}
