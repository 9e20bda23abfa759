pub use sea_orm_migration::prelude::*;

mod m20241016_101500_create_users_tweets_and_media;
mod m20241016_102300_create_likes_and_follows;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241016_101500_create_users_tweets_and_media::Migration),
            Box::new(m20241016_102300_create_likes_and_follows::Migration),
        ]
    }
}
