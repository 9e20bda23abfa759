use std::collections::HashMap;

use async_trait::async_trait;
use entity::{follow, user};
use itertools::Itertools;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
};
use tracing::debug;

use super::{Criteria, Store, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowPreload {
    /// The user on the `follower_id` side
    Follower,
    /// The user on the `followee_id` side
    Followee,
}

#[derive(Debug, Clone)]
pub struct FollowRecord {
    pub edge: follow::Model,
    pub follower: Option<user::Model>,
    pub followee: Option<user::Model>,
}

/// Social graph: directed follow edges between users.
///
/// Self-loops are not rejected here, that is up to the caller.
#[derive(Clone, Copy)]
pub struct FollowStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> FollowStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_edge(
        &self,
        follower_id: i32,
        followee_id: i32,
    ) -> StoreResult<Option<follow::Model>> {
        debug!(follower_id, followee_id, "looking up follow edge");

        Criteria::<follow::Entity, FollowPreload>::new()
            .eq(follow::Column::FollowerId, follower_id)
            .eq(follow::Column::FolloweeId, followee_id)
            .select()
            .one(self.db)
            .await
    }

    async fn users_by_id(&self, ids: Vec<i32>) -> StoreResult<HashMap<i32, user::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(self.db)
            .await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

#[async_trait]
impl<'a> Store for FollowStore<'a> {
    type Entity = follow::Entity;
    type ActiveModel = follow::ActiveModel;
    type Preload = FollowPreload;
    type Output = Vec<FollowRecord>;

    async fn add(&self, model: follow::ActiveModel) -> StoreResult<follow::Model> {
        let edge = model.insert(self.db).await?;
        debug!(
            follower_id = edge.follower_id,
            followee_id = edge.followee_id,
            "follow edge added"
        );

        Ok(edge)
    }

    async fn delete(&self, model: follow::Model) -> StoreResult<()> {
        debug!(
            follower_id = model.follower_id,
            followee_id = model.followee_id,
            "deleting follow edge"
        );
        model.delete(self.db).await?;

        Ok(())
    }

    async fn filter(
        &self,
        criteria: Criteria<follow::Entity, FollowPreload>,
    ) -> StoreResult<Vec<FollowRecord>> {
        let edges = criteria.select().all(self.db).await?;
        debug!(found = edges.len(), "follow edges filtered");

        let with_followers = criteria.preloads(&FollowPreload::Follower);
        let with_followees = criteria.preloads(&FollowPreload::Followee);

        let ids = edges
            .iter()
            .flat_map(|e| {
                [
                    with_followers.then_some(e.follower_id),
                    with_followees.then_some(e.followee_id),
                ]
            })
            .flatten()
            .unique()
            .collect();
        let users = self.users_by_id(ids).await?;

        Ok(edges
            .into_iter()
            .map(|edge| FollowRecord {
                follower: with_followers
                    .then(|| users.get(&edge.follower_id).cloned())
                    .flatten(),
                followee: with_followees
                    .then(|| users.get(&edge.followee_id).cloned())
                    .flatten(),
                edge,
            })
            .collect())
    }
}
