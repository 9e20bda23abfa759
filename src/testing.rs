//! Fixtures shared by the test modules.

use chrono::{DateTime, Duration, TimeZone, Utc};
use entity::{media, tweet, user};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, Set};
use tempfile::TempDir;

use crate::{
    models::storage::DiskStorage,
    store::{MediaStore, Store, TweetStore, UserStore},
};

/// Fresh migrated in-memory database. A single pooled connection keeps the
/// memory database alive for the whole test.
pub async fn database() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn disk() -> (TempDir, DiskStorage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = DiskStorage::new(dir.path(), "/media/");
    (dir, storage)
}

pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 16, 12, 0, 0).unwrap() + Duration::minutes(minute)
}

/// User whose api key is `"{name}-key"`.
pub async fn user(db: &DatabaseConnection, name: &str) -> user::Model {
    UserStore::new(db)
        .add(user::ActiveModel {
            name: Set(name.to_owned()),
            api_key: Set(format!("{name}-key")),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn tweet_at(
    db: &DatabaseConnection,
    author: &user::Model,
    content: &str,
    minute: i64,
) -> tweet::Model {
    TweetStore::new(db)
        .add(tweet::ActiveModel {
            author_id: Set(author.id),
            content: Set(content.to_owned()),
            created_at: Set(at(minute)),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn media(db: &DatabaseConnection, owner: &user::Model, path: &str) -> media::Model {
    MediaStore::new(db)
        .add(media::ActiveModel {
            file_path: Set(path.to_owned()),
            user_id: Set(owner.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .await
        .unwrap()
}
