use rocket::{delete, get, post, routes, serde::json::Json, Route, State};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::{
    models::{auth::CurrentUser, response::APIResponse, storage::DiskStorage},
    services::{tweets, Context},
};

pub fn routes() -> Vec<Route> {
    routes![create_tweet, delete_tweet, like_tweet, unlike_tweet, get_feed]
}

#[derive(Deserialize)]
struct NewTweet {
    tweet_data: String,
    #[serde(default)]
    tweet_media_ids: Option<Vec<i32>>,
}

#[post("/tweets", data = "<data>")]
async fn create_tweet(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    data: Json<NewTweet>,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());
    let NewTweet {
        tweet_data,
        tweet_media_ids,
    } = data.into_inner();

    tweets::create(&ctx, tweet_data, tweet_media_ids.unwrap_or_default())
        .await
        .into()
}

#[delete("/tweets/<id>")]
async fn delete_tweet(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    id: i32,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());

    tweets::delete(&ctx, id).await.into()
}

#[post("/tweets/<id>/likes")]
async fn like_tweet(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    id: i32,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());

    tweets::like(&ctx, id).await.into()
}

#[delete("/tweets/<id>/likes")]
async fn unlike_tweet(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    id: i32,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());

    tweets::unlike(&ctx, id).await.into()
}

/// `offset` is a page number when `limit` is given too.
#[get("/tweets?<limit>&<offset>")]
async fn get_feed(
    db: &State<DatabaseConnection>,
    files: &State<DiskStorage>,
    user: CurrentUser,
    limit: Option<u64>,
    offset: Option<u64>,
) -> APIResponse {
    let ctx = Context::new(db, &user.0, files.inner());

    tweets::feed(&ctx, limit, offset).await.into()
}
