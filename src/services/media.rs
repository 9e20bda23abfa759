//! Media lifecycle: upload, ownership validation when attaching to a new
//! tweet, and reclamation of media nothing links to anymore.

use chrono::Utc;
use entity::{media, tweet_media};
use itertools::Itertools;
use sea_orm::{ColumnTrait, Set};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{Context, ServiceError, ServiceResult};
use crate::{
    models::storage::{FileStorage, Removal},
    store::{Criteria, Store},
};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UploadedMedia {
    pub media_id: i32,
}

/// Stores the file under a fresh name (keeping `extension`) and records
/// it as owned by the caller.
pub async fn upload(
    ctx: &Context<'_>,
    bytes: &[u8],
    extension: Option<&str>,
) -> ServiceResult<UploadedMedia> {
    let name = match extension {
        Some(ext) => format!("{}.{ext}", Uuid::now_v7()),
        None => Uuid::now_v7().to_string(),
    };
    info!(user_id = ctx.user.id, size = bytes.len(), %name, "uploading media");

    let location = ctx.files.store(bytes, &name).await?;
    let media = ctx
        .media()
        .add(media::ActiveModel {
            file_path: Set(location),
            user_id: Set(ctx.user.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .await?;

    Ok(UploadedMedia { media_id: media.id })
}

/// Fetches the requested media, all of which must exist and belong to the
/// caller. Nothing is written.
pub async fn validate_owned(ctx: &Context<'_>, ids: &[i32]) -> ServiceResult<Vec<media::Model>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    debug!(user_id = ctx.user.id, ?ids, "checking media ownership");

    let found = ctx
        .media()
        .filter(
            Criteria::new()
                .when(media::Column::Id.is_in(ids.iter().copied().unique()))
                .eq(media::Column::UserId, ctx.user.id),
        )
        .await?;

    if found.len() != ids.len() {
        warn!(user_id = ctx.user.id, ?ids, "media not found or not owned");
        return Err(ServiceError::Validation(
            "Some media files not found or inaccessible".into(),
        ));
    }

    Ok(found)
}

/// Media of `tweet_id` that no other tweet links to, i.e. what deleting
/// the tweet has to reclaim.
///
/// Every returned file is checked to still be stored, so a deletion can
/// be refused with [`ServiceError::Inconsistency`] before anything is
/// written.
pub async fn orphaned_by(
    ctx: &Context<'_>,
    tweet_id: i32,
    media: Vec<media::Model>,
) -> ServiceResult<Vec<media::Model>> {
    let mut orphans = vec![];

    for item in media {
        let elsewhere = ctx
            .tweet_media()
            .count(
                Criteria::new()
                    .eq(tweet_media::Column::MediaId, item.id)
                    .when(tweet_media::Column::TweetId.ne(tweet_id)),
            )
            .await?;
        if elsewhere > 0 {
            debug!(media_id = item.id, elsewhere, "media shared with other tweets");
            continue;
        }

        if !ctx.files.exists(&item.file_path).await? {
            error!(media_id = item.id, path = %item.file_path, "media file is missing");
            return Err(missing(&item));
        }
        orphans.push(item);
    }

    Ok(orphans)
}

fn missing(item: &media::Model) -> ServiceError {
    ServiceError::Inconsistency(format!(
        "file {} of media {} is missing",
        item.file_path, item.id
    ))
}

/// Deletes each media row, and its file, that no tweet links to anymore.
///
/// Call after the links of the deleted tweet are gone. A missing file is
/// an [`ServiceError::Inconsistency`].
pub async fn reclaim(ctx: &Context<'_>, media: Vec<media::Model>) -> ServiceResult<()> {
    for item in media {
        let remaining = ctx
            .tweet_media()
            .count(Criteria::new().eq(tweet_media::Column::MediaId, item.id))
            .await?;

        if remaining > 0 {
            debug!(media_id = item.id, remaining, "media still linked, keeping it");
            continue;
        }

        if ctx.files.remove(&item.file_path).await? == Removal::Missing {
            error!(media_id = item.id, path = %item.file_path, "media file is missing");
            return Err(missing(&item));
        }

        info!(media_id = item.id, path = %item.file_path, "reclaiming orphaned media");
        ctx.media().delete(item).await?;
    }

    Ok(())
}
