//! In-process store with the same semantics as the PostgreSQL schema:
//! foreign keys, `ON DELETE CASCADE`, the `(post_id, user_id)` uniqueness on
//! likes and all-or-nothing transactions.
//!
//! Units of work are serialized behind one lock and run against a private
//! copy of the tables, which replaces the shared state only on success.

use std::sync::Arc;

use axum::async_trait;
use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ContentConn, ContentStore, PostWithOwner, StoreResult};
use crate::error::Result;
use crate::models::comment::{Comment, NewComment};
use crate::models::image::{Image, NewImage};
use crate::models::like::{Like, NewLike};
use crate::models::post::{NewPost, Post};
use crate::models::user::{NewUser, User};
use crate::pagination::PageRequest;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    images: Vec<Image>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
}

fn violation(kind: DatabaseErrorKind, constraint: &str) -> DieselError {
    DieselError::DatabaseError(kind, Box::new(constraint.to_string()))
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MemoryConn {
    tables: Tables,
}

impl MemoryConn {
    fn require_user(&self, id: Uuid, constraint: &str) -> StoreResult<()> {
        if self.tables.users.iter().any(|u| u.id == id) {
            Ok(())
        } else {
            let e = violation(DatabaseErrorKind::ForeignKeyViolation, constraint);
            Err(e.into())
        }
    }

    fn require_post(&self, id: Uuid, constraint: &str) -> StoreResult<()> {
        if self.tables.posts.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            let e = violation(DatabaseErrorKind::ForeignKeyViolation, constraint);
            Err(e.into())
        }
    }

    fn post_mut(&mut self, id: Uuid) -> StoreResult<&mut Post> {
        self.tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DieselError::NotFound.into())
    }

    fn page_of_posts(
        &self,
        owner: Option<&str>,
        page: PageRequest,
    ) -> (Vec<PostWithOwner>, u64) {
        let mut rows: Vec<PostWithOwner> = self
            .tables
            .posts
            .iter()
            .filter_map(|p| {
                let user = self.tables.users.iter().find(|u| u.id == p.user_id)?;
                Some((p.clone(), user.clone()))
            })
            .filter(|(_, u)| owner.map_or(true, |n| u.nickname == n))
            .collect();
        rows.sort_by(|(a, _), (b, _)| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let total = rows.len() as u64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        (items, total)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    type Conn = MemoryConn;

    async fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> BoxFuture<'c, Result<T>> + Send + 'static,
    {
        let mut shared = self.tables.lock().await;
        let mut conn = MemoryConn {
            tables: shared.clone(),
        };
        let out = f(&mut conn).await?;
        *shared = conn.tables;
        Ok(out)
    }

    async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&'c mut Self::Conn) -> BoxFuture<'c, Result<T>> + Send + 'static,
    {
        let snapshot = self.tables.lock().await.clone();
        let mut conn = MemoryConn { tables: snapshot };
        f(&mut conn).await
    }
}

#[async_trait]
impl ContentConn for MemoryConn {
    async fn insert_user(&mut self, user: NewUser) -> StoreResult<User> {
        if self.tables.users.iter().any(|u| u.nickname == user.nickname) {
            let e = violation(DatabaseErrorKind::UniqueViolation, "users_nickname_key");
            return Err(e.into());
        }
        let user = User {
            id: user.id,
            nickname: user.nickname,
            created_at: user.created_at,
        };
        self.tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&mut self, page: PageRequest) -> StoreResult<Vec<User>> {
        let mut us = self.tables.users.clone();
        us.sort_by_key(|u| (u.created_at, u.id));
        Ok(us
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn insert_post(&mut self, post: NewPost) -> StoreResult<Post> {
        self.require_user(post.user_id, "posts_user_id_fkey")?;
        let post = Post {
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            like_count: post.like_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        };
        self.tables.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&mut self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_post_for_update(&mut self, id: Uuid) -> StoreResult<Option<Post>> {
        // the whole unit of work already holds the store lock
        self.find_post(id).await
    }

    async fn update_post_content(
        &mut self,
        id: Uuid,
        title: String,
        content: String,
    ) -> StoreResult<Post> {
        let post = self.post_mut(id)?;
        post.title = title;
        post.content = content;
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn adjust_like_count(&mut self, id: Uuid, delta: i32) -> StoreResult<i32> {
        let post = self.post_mut(id)?;
        let next = post.like_count + delta;
        if next < 0 {
            let e = violation(DatabaseErrorKind::CheckViolation, "posts_like_count_check");
            return Err(e.into());
        }
        post.like_count = next;
        Ok(next)
    }

    async fn delete_post(&mut self, id: Uuid) -> StoreResult<()> {
        let t = &mut self.tables;
        t.posts.retain(|p| p.id != id);
        t.images.retain(|i| i.post_id != id);
        t.comments.retain(|c| c.post_id != id);
        t.likes.retain(|l| l.post_id != id);
        Ok(())
    }

    async fn list_posts(&mut self, page: PageRequest) -> StoreResult<(Vec<PostWithOwner>, u64)> {
        Ok(self.page_of_posts(None, page))
    }

    async fn list_posts_by_nickname(
        &mut self,
        nickname: &str,
        page: PageRequest,
    ) -> StoreResult<(Vec<PostWithOwner>, u64)> {
        Ok(self.page_of_posts(Some(nickname), page))
    }

    async fn insert_images(&mut self, images: Vec<NewImage>) -> StoreResult<Vec<Image>> {
        let mut saved = Vec::with_capacity(images.len());
        for i in images {
            self.require_post(i.post_id, "images_post_id_fkey")?;
            let image = Image {
                id: i.id,
                post_id: i.post_id,
                image_url: i.image_url,
                created_at: i.created_at,
            };
            self.tables.images.push(image.clone());
            saved.push(image);
        }
        Ok(saved)
    }

    async fn images_for_posts(&mut self, post_ids: &[Uuid]) -> StoreResult<Vec<Image>> {
        let mut found: Vec<Image> = self
            .tables
            .images
            .iter()
            .filter(|i| post_ids.contains(&i.post_id))
            .cloned()
            .collect();
        found.sort_by_key(|i| (i.created_at, i.id));
        Ok(found)
    }

    async fn insert_comment(&mut self, comment: NewComment) -> StoreResult<Comment> {
        self.require_post(comment.post_id, "comments_post_id_fkey")?;
        self.require_user(comment.user_id, "comments_user_id_fkey")?;
        if let Some(parent) = comment.parent_comment_id {
            if !self.tables.comments.iter().any(|c| c.id == parent) {
                return Err(violation(
                    DatabaseErrorKind::ForeignKeyViolation,
                    "comments_parent_comment_id_fkey",
                )
                .into());
            }
        }
        let comment = Comment {
            id: comment.id,
            post_id: comment.post_id,
            parent_comment_id: comment.parent_comment_id,
            user_id: comment.user_id,
            content: comment.content,
            created_at: comment.created_at,
        };
        self.tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&mut self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn comments_for_post(&mut self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let mut found: Vec<Comment> = self
            .tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        found.sort_by_key(|c| (c.created_at, c.id));
        Ok(found)
    }

    async fn insert_like(&mut self, like: NewLike) -> StoreResult<Like> {
        self.require_post(like.post_id, "likes_post_id_fkey")?;
        self.require_user(like.user_id, "likes_user_id_fkey")?;
        if self
            .tables
            .likes
            .iter()
            .any(|l| l.post_id == like.post_id && l.user_id == like.user_id)
        {
            let e = violation(DatabaseErrorKind::UniqueViolation, "likes_post_user_key");
            return Err(e.into());
        }
        let like = Like {
            id: like.id,
            post_id: like.post_id,
            user_id: like.user_id,
            created_at: like.created_at,
        };
        self.tables.likes.push(like.clone());
        Ok(like)
    }

    async fn find_like(&mut self, post_id: Uuid, user_id: Uuid) -> StoreResult<Option<Like>> {
        Ok(self
            .tables
            .likes
            .iter()
            .find(|l| l.post_id == post_id && l.user_id == user_id)
            .cloned())
    }

    async fn delete_like(&mut self, post_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.tables
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(())
    }

    async fn count_likes(&mut self, post_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .tables
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::post::PostContent;
    use futures::FutureExt;

    fn content() -> PostContent {
        PostContent {
            title: "t".into(),
            content: "c".into(),
        }
    }

    #[tokio::test]
    async fn failed_unit_of_work_leaves_no_trace() {
        let store = MemoryStore::new();
        let user = NewUser::from(crate::models::user::CreateUser {
            nickname: "ann".into(),
        });
        let user_id = user.id;
        store
            .transaction(move |conn| async move { Ok(conn.insert_user(user).await?) }.boxed())
            .await
            .unwrap();

        let res: Result<()> = store
            .transaction(move |conn| {
                async move {
                    conn.insert_post(NewPost::new(user_id, content())).await?;
                    Err(AppError::Validation("boom".into()))
                }
                .boxed()
            })
            .await;
        assert!(res.is_err());

        let (posts, total) = store
            .read(|conn| async move { Ok(conn.list_posts(PageRequest::default()).await?) }.boxed())
            .await
            .unwrap();
        assert!(posts.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn enforces_foreign_keys() {
        let store = MemoryStore::new();
        let err = store
            .transaction(|conn| {
                async move {
                    Ok(conn.insert_post(NewPost::new(Uuid::now_v7(), content())).await?)
                }
                .boxed()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Store(crate::error::StoreError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _
            )))
        ));
    }
}
