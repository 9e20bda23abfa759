use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(entity::user::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(entity::user::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(entity::user::Column::Name).string().not_null())
                    .col(
                        ColumnDef::new(entity::user::Column::ApiKey)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(entity::user::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(entity::tweet::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(entity::tweet::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(entity::tweet::Column::AuthorId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::tweet::Column::Content)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::tweet::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tweets_author")
                            .from(entity::tweet::Entity, entity::tweet::Column::AuthorId)
                            .to(entity::user::Entity, entity::user::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(entity::media::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(entity::media::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(entity::media::Column::FilePath)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::media::Column::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::media::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_media_owner")
                            .from(entity::media::Entity, entity::media::Column::UserId)
                            .to(entity::user::Entity, entity::user::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(entity::tweet_media::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(entity::tweet_media::Column::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(entity::tweet_media::Column::TweetId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(entity::tweet_media::Column::MediaId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tweet_media_tweet")
                            .from(
                                entity::tweet_media::Entity,
                                entity::tweet_media::Column::TweetId,
                            )
                            .to(entity::tweet::Entity, entity::tweet::Column::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tweet_media_media")
                            .from(
                                entity::tweet_media::Entity,
                                entity::tweet_media::Column::MediaId,
                            )
                            .to(entity::media::Entity, entity::media::Column::Id),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("unique_tweet_media")
                    .table(entity::tweet_media::Entity)
                    .col(entity::tweet_media::Column::TweetId)
                    .col(entity::tweet_media::Column::MediaId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(entity::tweet_media::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(entity::media::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(entity::tweet::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(entity::user::Entity).to_owned())
            .await
    }
}
