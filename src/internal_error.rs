use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use std::sync::PoisonError;

/// Failures of the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("No row with id {id} in {table}")]
    MissingRow { table: &'static str, id: i64 },

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> StoreError {
        StoreError::LockPoisoned
    }
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    NotFound(String),
}

impl InternalError {
    pub fn validation(what: impl Into<String>) -> InternalError {
        InternalError::Validation(what.into())
    }

    pub fn not_found(what: impl Into<String>) -> InternalError {
        InternalError::NotFound(what.into())
    }

    fn status(&self) -> Status {
        match self {
            InternalError::Validation(_) => Status::BadRequest,
            InternalError::NotFound(_) => Status::NotFound,
            InternalError::Store(_) => Status::InternalServerError,
        }
    }
}

impl<T> From<PoisonError<T>> for InternalError {
    fn from(e: PoisonError<T>) -> InternalError {
        InternalError::Store(StoreError::from(e))
    }
}

impl From<rusqlite::Error> for InternalError {
    fn from(e: rusqlite::Error) -> InternalError {
        InternalError::Store(StoreError::Database(e))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl<'r> Responder<'r, 'static> for InternalError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!(uri = %request.uri(), "{}", self);
        } else {
            warn!(uri = %request.uri(), "{}", self);
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).respond_to(request)
    }
}

pub type InternalResult<T> = Result<T, InternalError>;
