use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Serialize, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key)]
    /// Internal ID of media
    pub id: i32,
    /// Location handle returned by file storage
    pub file_path: String,
    /// ID of user, who uploaded the file
    pub user_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::tweet_media::Entity")]
    TweetMedia,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::tweet_media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TweetMedia.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
