use async_trait::async_trait;
use entity::tweet_media;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter,
};
use tracing::debug;

use super::{Criteria, NoPreload, Store, StoreResult};

/// Tweet attachment links.
#[derive(Clone, Copy)]
pub struct TweetMediaStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TweetMediaStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts every link in one statement. Nothing happens for an empty
    /// list.
    pub async fn add_all(&self, links: Vec<tweet_media::ActiveModel>) -> StoreResult<()> {
        if links.is_empty() {
            return Ok(());
        }

        let count = links.len();
        tweet_media::Entity::insert_many(links)
            .exec(self.db)
            .await?;
        debug!(count, "tweet media links added");

        Ok(())
    }

    /// Number of links matching `criteria`, ignoring its pagination.
    pub async fn count(&self, criteria: Criteria<tweet_media::Entity>) -> StoreResult<u64> {
        criteria.offset(None).limit(None).select().count(self.db).await
    }

    pub async fn delete_by_tweet(&self, tweet_id: i32) -> StoreResult<u64> {
        let result = tweet_media::Entity::delete_many()
            .filter(tweet_media::Column::TweetId.eq(tweet_id))
            .exec(self.db)
            .await?;
        debug!(tweet_id, removed = result.rows_affected, "tweet media links deleted");

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl<'a> Store for TweetMediaStore<'a> {
    type Entity = tweet_media::Entity;
    type ActiveModel = tweet_media::ActiveModel;
    type Preload = NoPreload;
    type Output = Option<tweet_media::Model>;

    async fn add(&self, model: tweet_media::ActiveModel) -> StoreResult<tweet_media::Model> {
        model.insert(self.db).await
    }

    async fn delete(&self, model: tweet_media::Model) -> StoreResult<()> {
        model.delete(self.db).await?;

        Ok(())
    }

    /// First matching link, or `None`.
    async fn filter(
        &self,
        criteria: Criteria<tweet_media::Entity>,
    ) -> StoreResult<Option<tweet_media::Model>> {
        criteria.select().one(self.db).await
    }
}
