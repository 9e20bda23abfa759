use async_trait::async_trait;
use entity::media;
use sea_orm::{ActiveModelTrait, DatabaseConnection, ModelTrait};
use tracing::debug;

use super::{Criteria, NoPreload, Store, StoreResult};

/// Metadata of uploaded files.
#[derive(Clone, Copy)]
pub struct MediaStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MediaStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl<'a> Store for MediaStore<'a> {
    type Entity = media::Entity;
    type ActiveModel = media::ActiveModel;
    type Preload = NoPreload;
    type Output = Vec<media::Model>;

    async fn add(&self, model: media::ActiveModel) -> StoreResult<media::Model> {
        let media = model.insert(self.db).await?;
        debug!(media_id = media.id, path = %media.file_path, "media added");

        Ok(media)
    }

    async fn delete(&self, model: media::Model) -> StoreResult<()> {
        let id = model.id;
        model.delete(self.db).await?;
        debug!(media_id = id, "media deleted");

        Ok(())
    }

    async fn filter(&self, criteria: Criteria<media::Entity>) -> StoreResult<Vec<media::Model>> {
        criteria.select().all(self.db).await
    }
}
