use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, put};
use axum::Router;
use log::error;
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::user::Sub;

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub type Result<T> = std::result::Result<T, Error>;

pub type Repository =
    std::sync::Arc<dyn repository::ConversationRepository + Send + Sync>;

/// Separator between the two participant ids. Participant ids are forbidden
/// from containing it, which keeps the mapping pair -> id injective.
const SEPARATOR: char = '_';

/// Canonical id of a two-party conversation: the participant ids in lexical
/// order, joined with `_`. Order-independent, so both parties derive the same
/// id without coordination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id(String);

impl Id {
    pub fn of(a: &Sub, b: &Sub) -> Result<Id> {
        for sub in [a, b] {
            if sub.as_str().is_empty() {
                return Err(Error::EmptyParticipant);
            }
            if sub.as_str().contains(SEPARATOR) {
                return Err(Error::InvalidParticipant(sub.to_owned()));
            }
        }
        if a == b {
            return Err(Error::SelfConversation);
        }

        let (first, second) = if a.as_str() < b.as_str() { (a, b) } else { (b, a) };
        Ok(Id(format!("{first}{SEPARATOR}{second}")))
    }

    /// Recovers the pair. Ids deserialized from a request may lack the
    /// separator, so this is fallible.
    pub fn participants(&self) -> Result<(Sub, Sub)> {
        let (first, second) = self
            .0
            .split_once(SEPARATOR)
            .ok_or_else(|| Error::MalformedId(self.clone()))?;
        Ok((Sub(first.to_owned()), Sub(second.to_owned())))
    }

    // a malformed id matches nobody
    pub fn contains(&self, sub: &Sub) -> bool {
        self.participants()
            .map(|(first, second)| first == *sub || second == *sub)
            .unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&Id> for mongodb::bson::Bson {
    fn from(id: &Id) -> Self {
        mongodb::bson::Bson::String(id.0.clone())
    }
}

pub fn api<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/conversations", get(handler::find_all))
        .route("/conversations/{id}/read", put(handler::mark_read))
        .route("/ws/conversations", any(handler::subscribe))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("conversation not found: {0:?}")]
    NotFound(Option<Id>),
    #[error("user is not a participant of the conversation")]
    NotParticipant,
    #[error("cannot open a conversation with oneself")]
    SelfConversation,
    #[error("participant id is empty")]
    EmptyParticipant,
    #[error("participant id is malformed: {0}")]
    InvalidParticipant(Sub),
    #[error("conversation id is malformed: {0}")]
    MalformedId(Id),
    #[error("conversation index is building, retry shortly")]
    IndexBuilding,

    #[error(transparent)]
    _MongoDB(mongodb::error::Error),
}

// Command error 291 means the server could not use a required index yet.
// It is the one store failure that is retryable rather than terminal.
const NO_QUERY_EXECUTION_PLANS: i32 = 291;

impl From<mongodb::error::Error> for Error {
    fn from(e: mongodb::error::Error) -> Self {
        if let mongodb::error::ErrorKind::Command(ref command) = *e.kind {
            if command.code == NO_QUERY_EXECUTION_PLANS {
                return Error::IndexBuilding;
            }
        }
        Error::_MongoDB(e)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{self}");

        let (status, message) = match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::NotParticipant => (StatusCode::FORBIDDEN, self.to_string()),
            Self::SelfConversation
            | Self::EmptyParticipant
            | Self::InvalidParticipant(_)
            | Self::MalformedId(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::IndexBuilding => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            Self::_MongoDB(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, message).into_response()
    }
}
