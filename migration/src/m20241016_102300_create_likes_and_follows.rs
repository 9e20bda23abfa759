use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(entity::like::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(entity::like::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(entity::like::Column::TweetId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::like::Column::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::like::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_likes_tweet")
                            .from(entity::like::Entity, entity::like::Column::TweetId)
                            .to(entity::tweet::Entity, entity::tweet::Column::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_likes_user")
                            .from(entity::like::Entity, entity::like::Column::UserId)
                            .to(entity::user::Entity, entity::user::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;
        // One like per user per tweet. The service checks first, this index
        // is what holds under concurrent requests.
        manager
            .create_index(
                Index::create()
                    .name("unique_like_tweet")
                    .table(entity::like::Entity)
                    .col(entity::like::Column::TweetId)
                    .col(entity::like::Column::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(entity::follow::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(entity::follow::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(entity::follow::Column::FollowerId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::follow::Column::FolloweeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::follow::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_followers_follower")
                            .from(entity::follow::Entity, entity::follow::Column::FollowerId)
                            .to(entity::user::Entity, entity::user::Column::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_followers_followee")
                            .from(entity::follow::Entity, entity::follow::Column::FolloweeId)
                            .to(entity::user::Entity, entity::user::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("unique_follower_followee")
                    .table(entity::follow::Entity)
                    .col(entity::follow::Column::FollowerId)
                    .col(entity::follow::Column::FolloweeId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(entity::follow::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(entity::like::Entity).to_owned())
            .await
    }
}
