use async_trait::async_trait;
use entity::user;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
};
use tracing::debug;

use super::{Criteria, NoPreload, Store, StoreResult};

#[derive(Clone, Copy)]
pub struct UserStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: i32) -> StoreResult<Option<user::Model>> {
        debug!(user_id = id, "looking up user");

        user::Entity::find_by_id(id).one(self.db).await
    }

    /// Resolves the `api-key` credential to its user.
    pub async fn get_by_api_key(&self, api_key: &str) -> StoreResult<Option<user::Model>> {
        user::Entity::find()
            .filter(user::Column::ApiKey.eq(api_key))
            .one(self.db)
            .await
    }
}

#[async_trait]
impl<'a> Store for UserStore<'a> {
    type Entity = user::Entity;
    type ActiveModel = user::ActiveModel;
    type Preload = NoPreload;
    type Output = Vec<user::Model>;

    async fn add(&self, model: user::ActiveModel) -> StoreResult<user::Model> {
        let user = model.insert(self.db).await?;
        debug!(user_id = user.id, name = %user.name, "user added");

        Ok(user)
    }

    async fn delete(&self, model: user::Model) -> StoreResult<()> {
        model.delete(self.db).await?;

        Ok(())
    }

    async fn filter(&self, criteria: Criteria<user::Entity>) -> StoreResult<Vec<user::Model>> {
        criteria.select().all(self.db).await
    }
}
