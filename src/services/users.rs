use chrono::Utc;
use entity::{follow, user};
use sea_orm::{Order, Set};
use serde::Serialize;
use tracing::{info, warn};

use super::{Context, ServiceError, ServiceResult};
use crate::store::{Criteria, FollowPreload, Store};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Profile {
    pub user: UserDetails,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserDetails {
    pub id: i32,
    pub name: String,
    pub followers: Vec<UserBasic>,
    pub following: Vec<UserBasic>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UserBasic {
    pub id: i32,
    pub name: String,
}

impl From<user::Model> for UserBasic {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

pub async fn follow(ctx: &Context<'_>, user_id: i32) -> ServiceResult<()> {
    info!(follower_id = ctx.user.id, followee_id = user_id, "following user");

    if user_id == ctx.user.id {
        return Err(ServiceError::Conflict("You can't subscribe to yourself".into()));
    }
    if ctx.users().get_by_id(user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User not found".into()));
    }
    if ctx.follows().get_edge(ctx.user.id, user_id).await?.is_some() {
        warn!(follower_id = ctx.user.id, followee_id = user_id, "already following");
        return Err(ServiceError::Conflict("You are already subscribed to this user".into()));
    }

    ctx.follows()
        .add(follow::ActiveModel {
            follower_id: Set(ctx.user.id),
            followee_id: Set(user_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        })
        .await
        .map_err(|e| ServiceError::on_duplicate(e, "You are already subscribed to this user"))?;

    Ok(())
}

pub async fn unfollow(ctx: &Context<'_>, user_id: i32) -> ServiceResult<()> {
    info!(follower_id = ctx.user.id, followee_id = user_id, "unfollowing user");

    if user_id == ctx.user.id {
        return Err(ServiceError::Conflict("You can't unsubscribe from yourself".into()));
    }
    if ctx.users().get_by_id(user_id).await?.is_none() {
        return Err(ServiceError::NotFound("User not found".into()));
    }

    let edge = ctx
        .follows()
        .get_edge(ctx.user.id, user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("You haven't subscribed to this user yet".into()))?;

    ctx.follows().delete(edge).await?;

    Ok(())
}

async fn details(ctx: &Context<'_>, user: user::Model) -> ServiceResult<Profile> {
    let followers = ctx
        .follows()
        .filter(
            Criteria::new()
                .eq(follow::Column::FolloweeId, user.id)
                .preload(FollowPreload::Follower)
                .order_by(follow::Column::Id, Order::Asc),
        )
        .await?
        .into_iter()
        .filter_map(|record| record.follower)
        .map(UserBasic::from)
        .collect();

    let following = ctx
        .follows()
        .filter(
            Criteria::new()
                .eq(follow::Column::FollowerId, user.id)
                .preload(FollowPreload::Followee)
                .order_by(follow::Column::Id, Order::Asc),
        )
        .await?
        .into_iter()
        .filter_map(|record| record.followee)
        .map(UserBasic::from)
        .collect();

    Ok(Profile {
        user: UserDetails {
            id: user.id,
            name: user.name,
            followers,
            following,
        },
    })
}

/// Profile of the authenticated user.
pub async fn own_profile(ctx: &Context<'_>) -> ServiceResult<Profile> {
    details(ctx, ctx.user.clone()).await
}

pub async fn profile(ctx: &Context<'_>, user_id: i32) -> ServiceResult<Profile> {
    let user = ctx
        .users()
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

    details(ctx, user).await
}
