use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Link between a tweet and one of its attachments. A media row may be
/// linked from several tweets; `(tweet_id, media_id)` is unique.
#[derive(Clone, Serialize, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tweet_media")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tweet_id: i32,
    pub media_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tweet::Entity",
        from = "Column::TweetId",
        to = "super::tweet::Column::Id"
    )]
    Tweet,
    #[sea_orm(
        belongs_to = "super::media::Entity",
        from = "Column::MediaId",
        to = "super::media::Column::Id"
    )]
    Media,
}

impl Related<super::tweet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tweet.def()
    }
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Media.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
