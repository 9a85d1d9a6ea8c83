use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use murajiah_core::{AuthError, DatabaseError, GameError, QuizError};
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("An owner account already exists")]
    OwnerExists,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    InvalidGameState(&'static str),
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::OwnerExists => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidGameState(_) => StatusCode::CONFLICT,
            Self::Conflict {
                resource: _,
                field: _,
                value: _,
            } => StatusCode::CONFLICT,
            Self::NotFound {
                resource: _,
                identifier: _,
            } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::OwnerExists => Self::OwnerExists,
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<GameError> for ServerError {
    fn from(value: GameError) -> Self {
        match value {
            GameError::NotGameHost => Self::Forbidden("Only the host can start this game"),
            GameError::EndNotPermitted => {
                Self::Forbidden("Only the host or a moderator can end this game")
            }
            GameError::GameEnded => Self::InvalidGameState("This game has already ended"),
            GameError::AlreadyStarted => Self::InvalidGameState("This game is already running"),
            GameError::Db(e) => e.into(),
        }
    }
}

impl From<QuizError> for ServerError {
    fn from(value: QuizError) -> Self {
        match value {
            QuizError::NotQuizOwner => {
                Self::Forbidden("Only the quiz owner or a moderator can change this quiz")
            }
            QuizError::Db(e) => e.into(),
        }
    }
}
