use async_trait::async_trait;
use entity::{like, media, tweet, tweet_media, user};
use sea_orm::{
    sea_query::{Expr, Query, SimpleExpr, SubQueryStatement},
    ActiveModelTrait, DatabaseConnection, EntityTrait, LoaderTrait, ModelTrait,
};
use tracing::debug;

use super::{Criteria, Store, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweetPreload {
    /// The posting user
    Author,
    /// Attachment links together with the media rows they point at
    Media,
    /// Likes together with the liking users
    Likes,
}

/// Tweet row plus the relations that were preloaded. A `None` field was
/// not requested.
#[derive(Debug, Clone)]
pub struct TweetRecord {
    pub tweet: tweet::Model,
    pub author: Option<user::Model>,
    pub media: Option<Vec<(tweet_media::Model, media::Model)>>,
    pub likes: Option<Vec<(like::Model, user::Model)>>,
}

#[derive(Clone, Copy)]
pub struct TweetStore<'a> {
    db: &'a DatabaseConnection,
}

/// Live number of likes of the tweet row the expression is evaluated
/// against. Use it as an ordering key.
pub fn like_count() -> SimpleExpr {
    let count = Query::select()
        .expr(Expr::col((like::Entity, like::Column::Id)).count())
        .from(like::Entity)
        .and_where(
            Expr::col((like::Entity, like::Column::TweetId))
                .equals((tweet::Entity, tweet::Column::Id)),
        )
        .to_owned();

    SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(count)))
}

impl<'a> TweetStore<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: i32) -> StoreResult<Option<tweet::Model>> {
        debug!(tweet_id = id, "looking up tweet");

        tweet::Entity::find_by_id(id).one(self.db).await
    }

    async fn load_media(
        &self,
        tweets: &[tweet::Model],
    ) -> StoreResult<Vec<Vec<(tweet_media::Model, media::Model)>>> {
        let links = tweets.load_many(tweet_media::Entity, self.db).await?;
        let flat = links.iter().flatten().cloned().collect::<Vec<_>>();
        let mut media = flat.load_one(media::Entity, self.db).await?.into_iter();

        // `media` is aligned with `flat`, one entry per link
        Ok(links
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .filter_map(|link| media.next().flatten().map(|m| (link, m)))
                    .collect()
            })
            .collect())
    }

    async fn load_likes(
        &self,
        tweets: &[tweet::Model],
    ) -> StoreResult<Vec<Vec<(like::Model, user::Model)>>> {
        let likes = tweets.load_many(like::Entity, self.db).await?;
        let flat = likes.iter().flatten().cloned().collect::<Vec<_>>();
        let mut users = flat.load_one(user::Entity, self.db).await?.into_iter();

        Ok(likes
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .filter_map(|like| users.next().flatten().map(|u| (like, u)))
                    .collect()
            })
            .collect())
    }
}

#[async_trait]
impl<'a> Store for TweetStore<'a> {
    type Entity = tweet::Entity;
    type ActiveModel = tweet::ActiveModel;
    type Preload = TweetPreload;
    type Output = Vec<TweetRecord>;

    async fn add(&self, model: tweet::ActiveModel) -> StoreResult<tweet::Model> {
        let tweet = model.insert(self.db).await?;
        debug!(tweet_id = tweet.id, author_id = tweet.author_id, "tweet added");

        Ok(tweet)
    }

    async fn delete(&self, model: tweet::Model) -> StoreResult<()> {
        let id = model.id;
        model.delete(self.db).await?;
        debug!(tweet_id = id, "tweet deleted");

        Ok(())
    }

    async fn filter(
        &self,
        criteria: Criteria<tweet::Entity, TweetPreload>,
    ) -> StoreResult<Vec<TweetRecord>> {
        let tweets = criteria.select().all(self.db).await?;
        debug!(found = tweets.len(), "tweets filtered");

        let mut authors = if criteria.preloads(&TweetPreload::Author) {
            Some(tweets.load_one(user::Entity, self.db).await?.into_iter())
        } else {
            None
        };
        let mut media = if criteria.preloads(&TweetPreload::Media) {
            Some(self.load_media(&tweets).await?.into_iter())
        } else {
            None
        };
        let mut likes = if criteria.preloads(&TweetPreload::Likes) {
            Some(self.load_likes(&tweets).await?.into_iter())
        } else {
            None
        };

        Ok(tweets
            .into_iter()
            .map(|tweet| TweetRecord {
                tweet,
                author: authors.as_mut().and_then(|it| it.next().flatten()),
                media: media.as_mut().and_then(Iterator::next),
                likes: likes.as_mut().and_then(Iterator::next),
            })
            .collect())
    }
}
