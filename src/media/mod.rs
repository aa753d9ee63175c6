use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use log::error;

use crate::integration;
use crate::state::AppState;

mod handler;

pub type Result<T> = std::result::Result<T, Error>;

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/media", post(handler::upload))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no file field in the upload request")]
    MissingFile,

    #[error(transparent)]
    _Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error(transparent)]
    _Integration(#[from] integration::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let (status, message) = match self {
            Self::MissingFile => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::_Multipart(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::_Integration(e) => return e.into_response(),
        };

        (status, message).into_response()
    }
}
