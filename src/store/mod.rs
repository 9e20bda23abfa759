//! Storage adapters, one per entity, all speaking the same [`Store`]
//! contract: `add`, `delete` and `filter` over a typed [`Criteria`].
//!
//! Every write commits immediately. Errors from the database are passed
//! through untouched as [`DbErr`].

use async_trait::async_trait;
use sea_orm::{
    sea_query::SimpleExpr, ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoSimpleExpr, Order,
    QueryFilter, QueryOrder, QuerySelect, Select, Value,
};

pub mod follow;
pub mod like;
pub mod media;
pub mod tweet;
pub mod tweet_media;
pub mod user;

pub use follow::{FollowPreload, FollowStore};
pub use like::LikeStore;
pub use media::MediaStore;
pub use tweet::{TweetPreload, TweetRecord, TweetStore};
pub use tweet_media::TweetMediaStore;
pub use user::UserStore;

pub type StoreResult<T> = Result<T, DbErr>;

/// Largest offset or limit a query is built with.
pub const MAX_ROWS: u64 = i64::MAX as u64;

type ModelOf<S> = <<S as Store>::Entity as EntityTrait>::Model;
type ActiveModelOf<S> = <S as Store>::ActiveModel;

/// Uniform query interface of an entity store.
///
/// `Output` is what `filter` yields: a `Vec` for entities that are listed,
/// an `Option` for relationships where only "first match or absence" makes
/// sense (likes, tweet attachments).
#[async_trait]
pub trait Store {
    type Entity: EntityTrait;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + Send;
    type Preload: Send;
    type Output: Send;

    /// Inserts a row and returns it with its generated id.
    async fn add(&self, model: ActiveModelOf<Self>) -> StoreResult<ModelOf<Self>>;

    async fn delete(&self, model: ModelOf<Self>) -> StoreResult<()>;

    async fn filter(&self, criteria: Criteria<Self::Entity, Self::Preload>)
        -> StoreResult<Self::Output>;
}

/// Marker for entities without eager relations. It has no values, so a
/// `Criteria<_, NoPreload>` can never carry a preload directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPreload {}

/// Query configuration for [`Store::filter`].
///
/// Equality and custom predicates are AND-combined. Ordering keys are
/// applied in insertion order. Offset and limit are applied after
/// filtering and ordering, and only when set.
pub struct Criteria<E: EntityTrait, P = NoPreload> {
    equals: Vec<(E::Column, Value)>,
    custom: Vec<SimpleExpr>,
    preload: Vec<P>,
    order: Vec<(SimpleExpr, Order)>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl<E: EntityTrait, P> Default for Criteria<E, P> {
    fn default() -> Self {
        Self {
            equals: vec![],
            custom: vec![],
            preload: vec![],
            order: vec![],
            offset: None,
            limit: None,
        }
    }
}

impl<E: EntityTrait, P: PartialEq> Criteria<E, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = value`
    pub fn eq(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.equals.push((column, value.into()));
        self
    }

    /// Arbitrary boolean expression over the entity.
    pub fn when(mut self, expr: SimpleExpr) -> Self {
        self.custom.push(expr);
        self
    }

    pub fn preload(mut self, relation: P) -> Self {
        if !self.preload.contains(&relation) {
            self.preload.push(relation);
        }
        self
    }

    pub fn order_by(mut self, expr: impl IntoSimpleExpr, order: Order) -> Self {
        self.order.push((expr.into_simple_expr(), order));
        self
    }

    pub fn offset(mut self, offset: Option<u64>) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn preloads(&self, relation: &P) -> bool {
        self.preload.contains(relation)
    }

    /// Builds the select statement for everything except preloads.
    pub fn select(&self) -> Select<E> {
        let mut query = E::find();

        for (column, value) in &self.equals {
            query = query.filter(column.eq(value.clone()));
        }
        for expr in &self.custom {
            query = query.filter(expr.clone());
        }
        for (expr, order) in &self.order {
            query = query.order_by(expr.clone(), order.clone());
        }

        // values are bound as signed 64-bit integers
        let offset = self.offset.map(|n| n.min(MAX_ROWS));
        let limit = self.limit.map(|n| n.min(MAX_ROWS));

        if let Some(offset) = offset {
            query = query.offset(offset);
        }
        // OFFSET without LIMIT is rejected by SQLite and MySQL
        match (offset, limit) {
            (_, Some(limit)) => query.limit(limit),
            (Some(_), None) => query.limit(MAX_ROWS),
            (None, None) => query,
        }
    }
}
