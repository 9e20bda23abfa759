use rocket::{delete, get, post, routes, Route, State};
use sea_orm::DatabaseConnection;

use crate::{
    models::{auth::CurrentUser, response::APIResponse, storage::DiskStorage},
    services::{users, Context},
};

pub fn routes() -> Vec<Route> {
    routes![follow_user, unfollow_user, get_self, get_by_id]
}

#[post("/users/<id>/follow")]
async fn follow_user(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    id: i32,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());

    users::follow(&ctx, id).await.into()
}

#[delete("/users/<id>/follow")]
async fn unfollow_user(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    id: i32,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());

    users::unfollow(&ctx, id).await.into()
}

#[get("/users/me")]
async fn get_self(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());

    users::own_profile(&ctx).await.into()
}

#[get("/users/<id>", rank = 2)]
async fn get_by_id(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    id: i32,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());

    users::profile(&ctx, id).await.into()
}
