use async_trait::async_trait;
use entity::like;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
};
use tracing::debug;

use super::{Criteria, NoPreload, Store, StoreResult};

#[derive(Clone, Copy)]
pub struct LikeStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LikeStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn delete_by_tweet(&self, tweet_id: i32) -> StoreResult<u64> {
        let result = like::Entity::delete_many()
            .filter(like::Column::TweetId.eq(tweet_id))
            .exec(self.db)
            .await?;
        debug!(tweet_id, removed = result.rows_affected, "likes deleted");

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl<'a> Store for LikeStore<'a> {
    type Entity = like::Entity;
    type ActiveModel = like::ActiveModel;
    type Preload = NoPreload;
    type Output = Option<like::Model>;

    async fn add(&self, model: like::ActiveModel) -> StoreResult<like::Model> {
        let like = model.insert(self.db).await?;
        debug!(tweet_id = like.tweet_id, user_id = like.user_id, "like added");

        Ok(like)
    }

    async fn delete(&self, model: like::Model) -> StoreResult<()> {
        debug!(tweet_id = model.tweet_id, user_id = model.user_id, "deleting like");
        model.delete(self.db).await?;

        Ok(())
    }

    /// The matching like, or `None`. At most one exists per (tweet, user).
    async fn filter(&self, criteria: Criteria<like::Entity>) -> StoreResult<Option<like::Model>> {
        criteria.select().one(self.db).await
    }
}
