//! Operations exposed to the HTTP layer. Each one takes an explicit
//! [`Context`] and composes store calls, returning a serializable result
//! or a [`ServiceError`].

use std::io;

use entity::user;
use rocket::http::Status;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};

use crate::{
    models::storage::FileStorage,
    store::{FollowStore, LikeStore, MediaStore, TweetMediaStore, TweetStore, UserStore},
};

pub mod media;
pub mod tweets;
pub mod users;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(#[from] DbErr),

    #[error("file storage failure: {0}")]
    File(#[from] io::Error),

    /// Database and file storage disagree. Never recovered from.
    #[error("storage inconsistency: {0}")]
    Inconsistency(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn status(&self) -> Status {
        match self {
            Self::NotFound(_) => Status::NotFound,
            Self::Conflict(_) => Status::Conflict,
            Self::Validation(_) => Status::BadRequest,
            Self::Storage(_) | Self::File(_) | Self::Inconsistency(_) => {
                Status::InternalServerError
            }
        }
    }

    /// Value of `error_type` in the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::Conflict(_) => "Conflict",
            Self::Validation(_) => "ValidationError",
            Self::Storage(_) => "StorageFailure",
            Self::File(_) => "FileStorageFailure",
            Self::Inconsistency(_) => "Inconsistency",
        }
    }

    /// Maps a unique-index violation on insert to `Conflict(message)`.
    /// Any other database error stays a storage failure.
    pub(crate) fn on_duplicate(err: DbErr, message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(message.to_owned()),
            _ => Self::Storage(err),
        }
    }
}

/// Everything a single request works with. Built by the route, dropped
/// when the handler returns.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub db: &'a DatabaseConnection,
    pub user: &'a user::Model,
    pub files: &'a dyn FileStorage,
}

impl<'a> Context<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        user: &'a user::Model,
        files: &'a dyn FileStorage,
    ) -> Self {
        Self { db, user, files }
    }

    pub fn users(&self) -> UserStore<'a> {
        UserStore::new(self.db)
    }

    pub fn tweets(&self) -> TweetStore<'a> {
        TweetStore::new(self.db)
    }

    pub fn media(&self) -> MediaStore<'a> {
        MediaStore::new(self.db)
    }

    pub fn tweet_media(&self) -> TweetMediaStore<'a> {
        TweetMediaStore::new(self.db)
    }

    pub fn likes(&self) -> LikeStore<'a> {
        LikeStore::new(self.db)
    }

    pub fn follows(&self) -> FollowStore<'a> {
        FollowStore::new(self.db)
    }
}
