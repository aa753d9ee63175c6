use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("media upload rejected with status {0}")]
    UploadRejected(u16),

    #[error(transparent)]
    _MongoDB(#[from] mongodb::error::Error),

    #[error(transparent)]
    _Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    _Var(#[from] std::env::VarError),

    #[error(transparent)]
    _ParseInt(#[from] std::num::ParseIntError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let (status, message) = match self {
            Self::UploadRejected(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            Self::_MongoDB(_) | Self::_Reqwest(_) | Self::_Var(_) | Self::_ParseInt(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, message).into_response()
    }
}
