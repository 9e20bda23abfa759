use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Directed follow edge. Both sides point at `users`, so there is no
/// `Related` impl: callers pick a side with [`Relation`].
#[derive(Clone, Serialize, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "followers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// ID of user, who follows
    pub follower_id: i32,
    /// ID of user, who is followed
    pub followee_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowerId",
        to = "super::user::Column::Id"
    )]
    Follower,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FolloweeId",
        to = "super::user::Column::Id"
    )]
    Followee,
}

impl ActiveModelBehavior for ActiveModel {}
