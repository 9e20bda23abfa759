use entity::user;
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use sea_orm::DatabaseConnection;
use tracing::{error, warn};

use crate::store::UserStore;

/// Header carrying the caller's credential.
pub const API_KEY_HEADER: &str = "api-key";

/// The user owning the `api-key` of the request.
pub struct CurrentUser(pub user::Model);

#[derive(Debug)]
pub enum AuthError {
    MissingKey,
    UnknownKey,
    NoDatabase,
    /// Looking the key up failed, the cause is logged.
    Storage,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(api_key) = request.headers().get_one(API_KEY_HEADER) else {
            return Outcome::Error((Status::Unauthorized, AuthError::MissingKey));
        };

        let Some(db) = request.rocket().state::<DatabaseConnection>() else {
            error!("database connection is not managed");
            return Outcome::Error((Status::InternalServerError, AuthError::NoDatabase));
        };

        match UserStore::new(db).get_by_api_key(api_key).await {
            Ok(Some(user)) => Outcome::Success(CurrentUser(user)),
            Ok(None) => {
                warn!("request with unknown api key");
                Outcome::Error((Status::Unauthorized, AuthError::UnknownKey))
            }
            Err(e) => {
                error!(error = %e, "failed to resolve api key");
                Outcome::Error((Status::InternalServerError, AuthError::Storage))
            }
        }
    }
}
