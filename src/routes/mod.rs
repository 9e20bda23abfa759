use rocket::{Build, Rocket};
use sea_orm::DatabaseConnection;

use crate::models::storage::DiskStorage;

pub mod catchers;
pub mod media;
pub mod tweets;
pub mod users;

/// Assembles the application around an open database and the upload
/// storage. Launch configuration is left to the caller.
pub fn build(db: DatabaseConnection, storage: DiskStorage) -> Rocket<Build> {
    rocket::build()
        .manage(db)
        .manage(storage)
        .register("/", catchers::catchers())
        .mount("/api", tweets::routes())
        .mount("/api", media::routes())
        .mount("/api", users::routes())
}
