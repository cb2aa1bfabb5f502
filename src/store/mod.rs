//! # Content store
//!
//! Persistence contract for users, posts, images, comments and likes.
//! Services never touch a connection outside of [`ContentStore::transaction`]
//! or [`ContentStore::read`], so every multi-step write is one atomic unit.

pub mod memory;
pub mod pg;

use axum::async_trait;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::comment::{Comment, NewComment};
use crate::models::image::{Image, NewImage};
use crate::models::like::{Like, NewLike};
use crate::models::post::{NewPost, Post};
use crate::models::user::{NewUser, User};
use crate::pagination::PageRequest;

pub use memory::MemoryStore;
pub use pg::PgStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A post row together with its owner.
pub type PostWithOwner = (Post, User);

/// Queries available inside a unit of work.
#[async_trait]
pub trait ContentConn: Send {
    async fn insert_user(&mut self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>>;
    async fn list_users(&mut self, page: PageRequest) -> StoreResult<Vec<User>>;

    async fn insert_post(&mut self, post: NewPost) -> StoreResult<Post>;
    async fn find_post(&mut self, id: Uuid) -> StoreResult<Option<Post>>;
    /// Like [`ContentConn::find_post`] but holds a row lock until the unit of work ends.
    async fn find_post_for_update(&mut self, id: Uuid) -> StoreResult<Option<Post>>;
    async fn update_post_content(
        &mut self,
        id: Uuid,
        title: String,
        content: String,
    ) -> StoreResult<Post>;
    /// Adds `delta` to the like counter and returns the new value.
    async fn adjust_like_count(&mut self, id: Uuid, delta: i32) -> StoreResult<i32>;
    /// Removes the post; images, comments and likes cascade.
    async fn delete_post(&mut self, id: Uuid) -> StoreResult<()>;
    /// Newest first, with the total row count.
    async fn list_posts(&mut self, page: PageRequest) -> StoreResult<(Vec<PostWithOwner>, u64)>;
    async fn list_posts_by_nickname(
        &mut self,
        nickname: &str,
        page: PageRequest,
    ) -> StoreResult<(Vec<PostWithOwner>, u64)>;

    async fn insert_images(&mut self, images: Vec<NewImage>) -> StoreResult<Vec<Image>>;
    /// Images of the given posts in creation order.
    async fn images_for_posts(&mut self, post_ids: &[Uuid]) -> StoreResult<Vec<Image>>;

    async fn insert_comment(&mut self, comment: NewComment) -> StoreResult<Comment>;
    async fn find_comment(&mut self, id: Uuid) -> StoreResult<Option<Comment>>;
    /// Comments of a post in creation order.
    async fn comments_for_post(&mut self, post_id: Uuid) -> StoreResult<Vec<Comment>>;

    async fn insert_like(&mut self, like: NewLike) -> StoreResult<Like>;
    async fn find_like(&mut self, post_id: Uuid, user_id: Uuid) -> StoreResult<Option<Like>>;
    async fn delete_like(&mut self, post_id: Uuid, user_id: Uuid) -> StoreResult<()>;
    async fn count_likes(&mut self, post_id: Uuid) -> StoreResult<i64>;
}

/// Hands out connections scoped to a unit of work.
#[async_trait]
pub trait ContentStore: Clone + Send + Sync + 'static {
    type Conn: ContentConn;

    /// Runs `f` in a read-committed transaction. Committed when `f` returns
    /// `Ok`, rolled back otherwise.
    async fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> BoxFuture<'c, Result<T>> + Send + 'static;

    /// Runs `f` against one consistent, read-only snapshot. Writes made by
    /// `f` fail or are discarded.
    async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> BoxFuture<'c, Result<T>> + Send + 'static;
}
