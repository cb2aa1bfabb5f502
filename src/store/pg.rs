//! PostgreSQL store on diesel-async, pooled with deadpool.

use axum::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use futures::future::BoxFuture;
use uuid::Uuid;

use super::{ContentConn, ContentStore, PostWithOwner, StoreResult};
use crate::error::Result;
use crate::models::comment::{Comment, NewComment};
use crate::models::image::{Image, NewImage};
use crate::models::like::{Like, NewLike};
use crate::models::post::{NewPost, Post};
use crate::models::user::{NewUser, User};
use crate::pagination::PageRequest;
use crate::schema::{comments, images, likes, posts, users};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies pending migrations over a blocking connection.
pub fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    let mut conn = PgConnection::establish(database_url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(count = applied.len(), "migrations applied");
    Ok(())
}

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgStore {
    pub fn new(pool: Pool<AsyncPgConnection>) -> Self {
        Self { pool }
    }

    pub fn connect(database_url: &str, max_size: usize) -> anyhow::Result<Self> {
        let mgr = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);

        let pool = Pool::builder(mgr)
            .max_size(max_size)
            .runtime(deadpool::Runtime::Tokio1)
            .build()?;
        tracing::info!(max_size, "database pool ready");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ContentStore for PgStore {
    type Conn = AsyncPgConnection;

    async fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> BoxFuture<'c, Result<T>> + Send + 'static,
    {
        let mut conn = self.pool.get().await?;
        conn.build_transaction()
            .read_committed()
            .run(move |conn| f(conn).scope_boxed())
            .await
    }

    async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> BoxFuture<'c, Result<T>> + Send + 'static,
    {
        let mut conn = self.pool.get().await?;
        conn.build_transaction()
            .repeatable_read()
            .read_only()
            .run(move |conn| f(conn).scope_boxed())
            .await
    }
}

#[async_trait]
impl ContentConn for AsyncPgConnection {
    async fn insert_user(&mut self, user: NewUser) -> StoreResult<User> {
        let user = diesel::insert_into(users::table)
            .values(user)
            .returning(User::as_returning())
            .get_result(self)
            .await?;
        Ok(user)
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        let user = users::table
            .find(id)
            .select(User::as_select())
            .first(self)
            .await
            .optional()?;
        Ok(user)
    }

    async fn list_users(&mut self, page: PageRequest) -> StoreResult<Vec<User>> {
        let us = users::table
            .order((users::created_at.asc(), users::id.asc()))
            .limit(page.limit())
            .offset(page.offset())
            .select(User::as_select())
            .load(self)
            .await?;
        Ok(us)
    }

    async fn insert_post(&mut self, post: NewPost) -> StoreResult<Post> {
        let post = diesel::insert_into(posts::table)
            .values(post)
            .returning(Post::as_returning())
            .get_result(self)
            .await?;
        Ok(post)
    }

    async fn find_post(&mut self, id: Uuid) -> StoreResult<Option<Post>> {
        let post = posts::table
            .find(id)
            .select(Post::as_select())
            .first(self)
            .await
            .optional()?;
        Ok(post)
    }

    async fn find_post_for_update(&mut self, id: Uuid) -> StoreResult<Option<Post>> {
        let post = posts::table
            .find(id)
            .select(Post::as_select())
            .for_update()
            .get_result(self)
            .await
            .optional()?;
        Ok(post)
    }

    async fn update_post_content(
        &mut self,
        id: Uuid,
        title: String,
        content: String,
    ) -> StoreResult<Post> {
        let post = diesel::update(posts::table.find(id))
            .set((
                posts::title.eq(title),
                posts::content.eq(content),
                posts::updated_at.eq(Utc::now()),
            ))
            .returning(Post::as_returning())
            .get_result(self)
            .await?;
        Ok(post)
    }

    async fn adjust_like_count(&mut self, id: Uuid, delta: i32) -> StoreResult<i32> {
        let count = diesel::update(posts::table.find(id))
            .set(posts::like_count.eq(posts::like_count + delta))
            .returning(posts::like_count)
            .get_result::<i32>(self)
            .await?;
        Ok(count)
    }

    async fn delete_post(&mut self, id: Uuid) -> StoreResult<()> {
        diesel::delete(posts::table.find(id)).execute(self).await?;
        Ok(())
    }

    async fn list_posts(&mut self, page: PageRequest) -> StoreResult<(Vec<PostWithOwner>, u64)> {
        let rows = posts::table
            .inner_join(users::table)
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(page.limit())
            .offset(page.offset())
            .select((Post::as_select(), User::as_select()))
            .load::<PostWithOwner>(&mut *self)
            .await?;
        let total: i64 = posts::table.count().get_result(&mut *self).await?;
        Ok((rows, total as u64))
    }

    async fn list_posts_by_nickname(
        &mut self,
        nickname: &str,
        page: PageRequest,
    ) -> StoreResult<(Vec<PostWithOwner>, u64)> {
        let rows = posts::table
            .inner_join(users::table)
            .filter(users::nickname.eq(nickname))
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(page.limit())
            .offset(page.offset())
            .select((Post::as_select(), User::as_select()))
            .load::<PostWithOwner>(&mut *self)
            .await?;
        let total: i64 = posts::table
            .inner_join(users::table)
            .filter(users::nickname.eq(nickname))
            .count()
            .get_result(&mut *self)
            .await?;
        Ok((rows, total as u64))
    }

    async fn insert_images(&mut self, new_images: Vec<NewImage>) -> StoreResult<Vec<Image>> {
        if new_images.is_empty() {
            return Ok(Vec::new());
        }
        let saved = diesel::insert_into(images::table)
            .values(new_images)
            .returning(Image::as_returning())
            .get_results(self)
            .await?;
        Ok(saved)
    }

    async fn images_for_posts(&mut self, post_ids: &[Uuid]) -> StoreResult<Vec<Image>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = images::table
            .filter(images::post_id.eq_any(post_ids.to_vec()))
            .order((images::created_at.asc(), images::id.asc()))
            .select(Image::as_select())
            .load(self)
            .await?;
        Ok(found)
    }

    async fn insert_comment(&mut self, comment: NewComment) -> StoreResult<Comment> {
        let comment = diesel::insert_into(comments::table)
            .values(comment)
            .returning(Comment::as_returning())
            .get_result(self)
            .await?;
        Ok(comment)
    }

    async fn find_comment(&mut self, id: Uuid) -> StoreResult<Option<Comment>> {
        let comment = comments::table
            .find(id)
            .select(Comment::as_select())
            .first(self)
            .await
            .optional()?;
        Ok(comment)
    }

    async fn comments_for_post(&mut self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let found = comments::table
            .filter(comments::post_id.eq(post_id))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select(Comment::as_select())
            .load(self)
            .await?;
        Ok(found)
    }

    async fn insert_like(&mut self, like: NewLike) -> StoreResult<Like> {
        let like = diesel::insert_into(likes::table)
            .values(like)
            .returning(Like::as_returning())
            .get_result(self)
            .await?;
        Ok(like)
    }

    async fn find_like(&mut self, post_id: Uuid, user_id: Uuid) -> StoreResult<Option<Like>> {
        let like = likes::table
            .filter(likes::post_id.eq(post_id))
            .filter(likes::user_id.eq(user_id))
            .select(Like::as_select())
            .first(self)
            .await
            .optional()?;
        Ok(like)
    }

    async fn delete_like(&mut self, post_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        diesel::delete(
            likes::table
                .filter(likes::post_id.eq(post_id))
                .filter(likes::user_id.eq(user_id)),
        )
        .execute(self)
        .await?;
        Ok(())
    }

    async fn count_likes(&mut self, post_id: Uuid) -> StoreResult<i64> {
        let n = likes::table
            .filter(likes::post_id.eq(post_id))
            .count()
            .get_result(self)
            .await?;
        Ok(n)
    }
}
