use std::iter;

use chrono::Utc;
use entity::{follow, like, tweet, tweet_media};
use itertools::Itertools;
use sea_orm::{ColumnTrait, Order, Set};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{media, Context, ServiceError, ServiceResult};
use crate::store::{tweet::like_count, Criteria, Store, TweetPreload, TweetRecord};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CreatedTweet {
    pub tweet_id: i32,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Feed {
    pub tweets: Vec<TweetView>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct TweetView {
    pub id: i32,
    pub content: String,
    /// File locations of the attached media
    pub attachments: Vec<String>,
    pub author: AuthorView,
    pub likes: Vec<LikeView>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AuthorView {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LikeView {
    pub user_id: i32,
    pub name: String,
}

impl From<TweetRecord> for TweetView {
    fn from(record: TweetRecord) -> Self {
        let TweetRecord {
            tweet,
            author,
            media,
            likes,
        } = record;

        Self {
            id: tweet.id,
            content: tweet.content,
            attachments: media
                .unwrap_or_default()
                .into_iter()
                .map(|(_, m)| m.file_path)
                .collect(),
            author: author.map_or_else(
                || AuthorView {
                    id: tweet.author_id,
                    name: String::new(),
                },
                |a| AuthorView {
                    id: a.id,
                    name: a.name,
                },
            ),
            likes: likes
                .unwrap_or_default()
                .into_iter()
                .map(|(like, user)| LikeView {
                    user_id: like.user_id,
                    name: user.name,
                })
                .collect(),
        }
    }
}

/// Creates a tweet with the given attachments, which must all be owned by
/// the caller. On a validation failure nothing is written.
pub async fn create(
    ctx: &Context<'_>,
    content: String,
    media_ids: Vec<i32>,
) -> ServiceResult<CreatedTweet> {
    info!(user_id = ctx.user.id, media = media_ids.len(), "creating tweet");

    let media = media::validate_owned(ctx, &media_ids).await?;

    let tweet = ctx
        .tweets()
        .add(tweet::ActiveModel {
            author_id: Set(ctx.user.id),
            content: Set(content),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .await?;

    let links = media
        .iter()
        .map(|m| tweet_media::ActiveModel {
            tweet_id: Set(tweet.id),
            media_id: Set(m.id),
            ..Default::default()
        })
        .collect();
    ctx.tweet_media().add_all(links).await?;

    Ok(CreatedTweet { tweet_id: tweet.id })
}

/// Deletes one of the caller's tweets with its likes and attachment links,
/// then reclaims attachments no other tweet uses.
pub async fn delete(ctx: &Context<'_>, tweet_id: i32) -> ServiceResult<()> {
    info!(user_id = ctx.user.id, tweet_id, "deleting tweet");

    let record = ctx
        .tweets()
        .filter(
            Criteria::new()
                .eq(tweet::Column::Id, tweet_id)
                .eq(tweet::Column::AuthorId, ctx.user.id)
                .preload(TweetPreload::Media),
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            warn!(user_id = ctx.user.id, tweet_id, "tweet missing or not owned");
            ServiceError::NotFound("Tweet not found or not owned by the user".into())
        })?;

    let media = record
        .media
        .unwrap_or_default()
        .into_iter()
        .map(|(_, m)| m)
        .collect();
    // refuses before any write if an orphan's file is already gone
    let orphans = media::orphaned_by(ctx, tweet_id, media).await?;

    ctx.likes().delete_by_tweet(tweet_id).await?;
    ctx.tweet_media().delete_by_tweet(tweet_id).await?;
    media::reclaim(ctx, orphans).await?;

    ctx.tweets().delete(record.tweet).await?;

    Ok(())
}

pub async fn like(ctx: &Context<'_>, tweet_id: i32) -> ServiceResult<()> {
    info!(user_id = ctx.user.id, tweet_id, "liking tweet");

    if ctx.tweets().get_by_id(tweet_id).await?.is_none() {
        return Err(ServiceError::NotFound("Tweet not found".into()));
    }

    let existing = ctx
        .likes()
        .filter(
            Criteria::new()
                .eq(like::Column::TweetId, tweet_id)
                .eq(like::Column::UserId, ctx.user.id),
        )
        .await?;
    if existing.is_some() {
        warn!(user_id = ctx.user.id, tweet_id, "tweet already liked");
        return Err(ServiceError::Conflict("You can't put more than 1 like".into()));
    }

    // a concurrent like can still slip between the check and the insert,
    // the unique index turns it into the same conflict
    ctx.likes()
        .add(like::ActiveModel {
            tweet_id: Set(tweet_id),
            user_id: Set(ctx.user.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .await
        .map_err(|e| ServiceError::on_duplicate(e, "You can't put more than 1 like"))?;

    Ok(())
}

pub async fn unlike(ctx: &Context<'_>, tweet_id: i32) -> ServiceResult<()> {
    info!(user_id = ctx.user.id, tweet_id, "removing like");

    if ctx.tweets().get_by_id(tweet_id).await?.is_none() {
        return Err(ServiceError::NotFound("Tweet not found".into()));
    }

    let like = ctx
        .likes()
        .filter(
            Criteria::new()
                .eq(like::Column::TweetId, tweet_id)
                .eq(like::Column::UserId, ctx.user.id),
        )
        .await?
        .ok_or_else(|| ServiceError::NotFound("You haven't liked this tweet yet".into()))?;

    ctx.likes().delete(like).await?;

    Ok(())
}

/// Row window for the feed. With both values given `page` is a 1-based
/// page number, so the offset is `(page - 1) * limit`. A lone value is
/// used as is.
fn page_window(limit: Option<u64>, page: Option<u64>) -> (Option<u64>, Option<u64>) {
    match (limit, page) {
        (Some(limit), Some(page)) => {
            let offset = page.saturating_sub(1).saturating_mul(limit);
            (Some(offset), Some(limit))
        }
        (limit, offset) => (offset, limit),
    }
}

/// Tweets of the caller and everyone they follow, most liked first, then
/// newest first.
pub async fn feed(ctx: &Context<'_>, limit: Option<u64>, page: Option<u64>) -> ServiceResult<Feed> {
    let following = ctx
        .follows()
        .filter(Criteria::new().eq(follow::Column::FollowerId, ctx.user.id))
        .await?;

    let authors = following
        .iter()
        .map(|f| f.edge.followee_id)
        .chain(iter::once(ctx.user.id))
        .unique()
        .collect::<Vec<_>>();
    debug!(user_id = ctx.user.id, ?authors, "feed authors resolved");

    let (offset, limit) = page_window(limit, page);
    let records = ctx
        .tweets()
        .filter(
            Criteria::new()
                .when(tweet::Column::AuthorId.is_in(authors))
                .preload(TweetPreload::Author)
                .preload(TweetPreload::Media)
                .preload(TweetPreload::Likes)
                .order_by(like_count(), Order::Desc)
                .order_by(tweet::Column::CreatedAt, Order::Desc)
                .order_by(tweet::Column::Id, Order::Desc)
                .offset(offset)
                .limit(limit),
        )
        .await?;
    info!(user_id = ctx.user.id, count = records.len(), "feed assembled");

    Ok(Feed {
        tweets: records.into_iter().map(TweetView::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use entity::{like, media};
    use sea_orm::{EntityTrait, QueryFilter};

    use super::*;
    use crate::{
        models::storage::FileStorage,
        services::users,
        store::{LikeStore, MediaStore, TweetMediaStore},
        testing::{self, disk},
    };

    async fn like_as(db: &sea_orm::DatabaseConnection, user: &entity::user::Model, tweet_id: i32) {
        let (_dir, files) = disk();
        like(&Context::new(db, user, &files), tweet_id).await.unwrap();
    }

    #[test]
    fn page_is_one_based() {
        assert_eq!(page_window(Some(5), Some(2)), (Some(5), Some(5)));
        assert_eq!(page_window(Some(5), Some(1)), (Some(0), Some(5)));
        assert_eq!(page_window(Some(5), Some(0)), (Some(0), Some(5)));
        assert_eq!(page_window(None, Some(3)), (Some(3), None));
        assert_eq!(page_window(Some(4), None), (None, Some(4)));
        assert_eq!(page_window(None, None), (None, None));
    }

    #[rocket::async_test]
    async fn create_links_owned_media() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let first = testing::media(&db, &alice, "/media/1.png").await;
        let second = testing::media(&db, &alice, "/media/2.png").await;
        let ctx = Context::new(&db, &alice, &files);

        let created = create(&ctx, "hello".into(), vec![first.id, second.id])
            .await
            .unwrap();

        let links = TweetMediaStore::new(&db)
            .count(Criteria::new().eq(tweet_media::Column::TweetId, created.tweet_id))
            .await
            .unwrap();
        assert_eq!(links, 2);

        let feed = feed(&ctx, None, None).await.unwrap();
        assert_eq!(feed.tweets.len(), 1);
        assert_eq!(feed.tweets[0].content, "hello");
        assert_eq!(feed.tweets[0].attachments, vec!["/media/1.png", "/media/2.png"]);
    }

    #[rocket::async_test]
    async fn create_with_foreign_media_writes_nothing() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let bob = testing::user(&db, "bob").await;
        let foreign = testing::media(&db, &bob, "/media/b.png").await;
        let ctx = Context::new(&db, &alice, &files);

        let result = create(&ctx, "stolen".into(), vec![foreign.id]).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert!(ctx.tweets().filter(Criteria::new()).await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn second_like_conflicts_and_keeps_one_row() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let tweet = testing::tweet_at(&db, &alice, "likeable", 0).await;
        let ctx = Context::new(&db, &alice, &files);

        like(&ctx, tweet.id).await.unwrap();
        let second = like(&ctx, tweet.id).await;

        assert!(matches!(second, Err(ServiceError::Conflict(_))));
        let rows = like::Entity::find()
            .filter(like::Column::TweetId.eq(tweet.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[rocket::async_test]
    async fn duplicate_insert_maps_to_conflict() {
        let db = testing::database().await;
        let alice = testing::user(&db, "alice").await;
        let tweet = testing::tweet_at(&db, &alice, "raced", 0).await;
        let row = || like::ActiveModel {
            tweet_id: Set(tweet.id),
            user_id: Set(alice.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        LikeStore::new(&db).add(row()).await.unwrap();
        let err = LikeStore::new(&db).add(row()).await.unwrap_err();

        assert!(matches!(
            ServiceError::on_duplicate(err, "dup"),
            ServiceError::Conflict(m) if m == "dup"
        ));
    }

    #[rocket::async_test]
    async fn unlike_requires_an_existing_like() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let tweet = testing::tweet_at(&db, &alice, "never liked", 0).await;
        let ctx = Context::new(&db, &alice, &files);

        assert!(matches!(unlike(&ctx, tweet.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(unlike(&ctx, 404).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(like(&ctx, 404).await, Err(ServiceError::NotFound(_))));

        like(&ctx, tweet.id).await.unwrap();
        unlike(&ctx, tweet.id).await.unwrap();
        assert!(matches!(unlike(&ctx, tweet.id).await, Err(ServiceError::NotFound(_))));
    }

    #[rocket::async_test]
    async fn delete_is_owner_only_and_cascades() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let bob = testing::user(&db, "bob").await;
        let tweet = testing::tweet_at(&db, &alice, "mine", 0).await;
        like_as(&db, &bob, tweet.id).await;

        let as_bob = Context::new(&db, &bob, &files);
        assert!(matches!(delete(&as_bob, tweet.id).await, Err(ServiceError::NotFound(_))));

        let as_alice = Context::new(&db, &alice, &files);
        delete(&as_alice, tweet.id).await.unwrap();

        assert!(as_alice.tweets().get_by_id(tweet.id).await.unwrap().is_none());
        assert!(like::Entity::find().all(&db).await.unwrap().is_empty());
        assert!(matches!(delete(&as_alice, tweet.id).await, Err(ServiceError::NotFound(_))));
    }

    #[rocket::async_test]
    async fn shared_media_is_reclaimed_with_its_last_tweet() {
        let db = testing::database().await;
        let (dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let ctx = Context::new(&db, &alice, &files);

        let location = files.store(b"shared", "shared.png").await.unwrap();
        let shared = testing::media(&db, &alice, &location).await;
        let first = create(&ctx, "one".into(), vec![shared.id]).await.unwrap();
        let second = create(&ctx, "two".into(), vec![shared.id]).await.unwrap();

        delete(&ctx, first.tweet_id).await.unwrap();
        assert_eq!(
            MediaStore::new(&db).filter(Criteria::new()).await.unwrap(),
            vec![shared]
        );
        assert!(dir.path().join("shared.png").exists());

        delete(&ctx, second.tweet_id).await.unwrap();
        assert!(MediaStore::new(&db)
            .filter(Criteria::<media::Entity>::new())
            .await
            .unwrap()
            .is_empty());
        assert!(!dir.path().join("shared.png").exists());
    }

    #[rocket::async_test]
    async fn feed_ranks_by_likes_then_recency() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let bob = testing::user(&db, "bob").await;
        let carol = testing::user(&db, "carol").await;

        let old_popular = testing::tweet_at(&db, &alice, "old popular", 0).await;
        let old_quiet = testing::tweet_at(&db, &alice, "old quiet", 1).await;
        let new_quiet = testing::tweet_at(&db, &alice, "new quiet", 2).await;
        let new_liked = testing::tweet_at(&db, &alice, "new liked", 3).await;

        like_as(&db, &bob, old_popular.id).await;
        like_as(&db, &carol, old_popular.id).await;
        like_as(&db, &bob, new_liked.id).await;

        let ctx = Context::new(&db, &alice, &files);
        let feed = feed(&ctx, None, None).await.unwrap();

        let order = feed.tweets.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(order, vec![old_popular.id, new_liked.id, new_quiet.id, old_quiet.id]);
        assert_eq!(
            feed.tweets[0].likes,
            vec![
                LikeView { user_id: bob.id, name: "bob".into() },
                LikeView { user_id: carol.id, name: "carol".into() },
            ]
        );
        assert_eq!(feed.tweets[0].author, AuthorView { id: alice.id, name: "alice".into() });
    }

    #[rocket::async_test]
    async fn like_count_is_live() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let bob = testing::user(&db, "bob").await;
        let older = testing::tweet_at(&db, &alice, "older", 0).await;
        let newer = testing::tweet_at(&db, &alice, "newer", 1).await;
        let ctx = Context::new(&db, &alice, &files);
        let as_bob = Context::new(&db, &bob, &files);

        let ids = |feed: Feed| feed.tweets.into_iter().map(|t| t.id).collect::<Vec<_>>();

        assert_eq!(ids(feed(&ctx, None, None).await.unwrap()), vec![newer.id, older.id]);

        like(&as_bob, older.id).await.unwrap();
        assert_eq!(ids(feed(&ctx, None, None).await.unwrap()), vec![older.id, newer.id]);

        unlike(&as_bob, older.id).await.unwrap();
        assert_eq!(ids(feed(&ctx, None, None).await.unwrap()), vec![newer.id, older.id]);
    }

    #[rocket::async_test]
    async fn feed_covers_followees_and_self_only() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let u = testing::user(&db, "u").await;
        let v = testing::user(&db, "v").await;
        let w = testing::user(&db, "w").await;
        let own = testing::tweet_at(&db, &u, "from u", 0).await;
        let followed = testing::tweet_at(&db, &v, "from v", 1).await;
        testing::tweet_at(&db, &w, "from w", 2).await;
        let ctx = Context::new(&db, &u, &files);

        let alone = feed(&ctx, None, None).await.unwrap();
        assert_eq!(alone.tweets.iter().map(|t| t.id).collect::<Vec<_>>(), vec![own.id]);

        users::follow(&ctx, v.id).await.unwrap();
        let feed = feed(&ctx, None, None).await.unwrap();

        assert_eq!(
            feed.tweets.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![followed.id, own.id]
        );
        assert!(feed.tweets.iter().all(|t| t.author.id != w.id));
    }

    #[rocket::async_test]
    async fn second_page_skips_one_page_of_rows() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let mut newest_first = vec![];
        for minute in 0..12 {
            let tweet = testing::tweet_at(&db, &alice, &format!("t{minute}"), minute).await;
            newest_first.insert(0, tweet.id);
        }
        let ctx = Context::new(&db, &alice, &files);

        let page = feed(&ctx, Some(5), Some(2)).await.unwrap();

        let ids = page.tweets.iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids, newest_first[5..10].to_vec());
    }

    #[rocket::async_test]
    async fn oversized_pagination_yields_rows_or_nothing() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        for minute in 0..3 {
            testing::tweet_at(&db, &alice, &format!("t{minute}"), minute).await;
        }
        let ctx = Context::new(&db, &alice, &files);

        assert_eq!(feed(&ctx, Some(u64::MAX), None).await.unwrap().tweets.len(), 3);
        assert!(feed(&ctx, Some(5), Some(1 << 62)).await.unwrap().tweets.is_empty());
        assert!(feed(&ctx, None, Some(u64::MAX)).await.unwrap().tweets.is_empty());
    }

    #[rocket::async_test]
    async fn delete_with_missing_file_writes_nothing() {
        let db = testing::database().await;
        let (_dir, files) = disk();
        let alice = testing::user(&db, "alice").await;
        let bob = testing::user(&db, "bob").await;
        let ghost = testing::media(&db, &alice, "/media/ghost.png").await;
        let ctx = Context::new(&db, &alice, &files);
        let tweet = create(&ctx, "haunted".into(), vec![ghost.id]).await.unwrap();
        like_as(&db, &bob, tweet.tweet_id).await;

        for _ in 0..2 {
            let result = delete(&ctx, tweet.tweet_id).await;
            assert!(matches!(result, Err(ServiceError::Inconsistency(_))));
        }

        assert!(ctx.tweets().get_by_id(tweet.tweet_id).await.unwrap().is_some());
        assert_eq!(like::Entity::find().all(&db).await.unwrap().len(), 1);
        let links = TweetMediaStore::new(&db)
            .count(Criteria::new().eq(tweet_media::Column::MediaId, ghost.id))
            .await
            .unwrap();
        assert_eq!(links, 1);
        assert_eq!(
            MediaStore::new(&db).filter(Criteria::new()).await.unwrap(),
            vec![ghost]
        );
    }
}
