//! # Post aggregation
//!
//! Read views (detail, main page, blog listing) and owner-only writes.
//! Every write runs as a single unit of work so the existence and ownership
//! checks observe the same row the mutation touches.

use std::collections::HashMap;

use axum::async_trait;
use futures::FutureExt;
use uuid::Uuid;

use super::likes::{self, Toggled};
use super::{comment_tree, Svc};
use crate::error::{AppError, Result};
use crate::helpers::LogErr;
use crate::models::image::{Image, NewImage};
use crate::models::post::{NewPost, PostContent};
use crate::pagination::{Page, PageLimits, PageRequest};
use crate::store::{ContentConn, ContentStore, PostWithOwner};
use crate::views::{PostDetailView, PostSummaryView, PostView};

pub const MAX_TITLE_CHARS: usize = 200;

#[async_trait]
pub trait PostService: Svc {
    async fn create_post(
        &self,
        content: PostContent,
        owner: Uuid,
        image_refs: Vec<String>,
    ) -> Result<PostView>;
    async fn list_main_page(&self, page: PageRequest) -> Result<Page<PostSummaryView>>;
    async fn list_by_owner_nickname(
        &self,
        nickname: &str,
        page: PageRequest,
    ) -> Result<Page<PostSummaryView>>;
    async fn get_post_detail(&self, post_id: Uuid) -> Result<PostDetailView>;
    async fn update_post(
        &self,
        post_id: Uuid,
        content: PostContent,
        acting_user: Uuid,
    ) -> Result<PostView>;
    async fn delete_post(&self, post_id: Uuid, acting_user: Uuid) -> Result<()>;
    /// Returns the post's like count after the flip.
    async fn toggle_like(&self, post_id: Uuid, acting_user: Uuid) -> Result<i32>;
}

#[derive(Clone)]
pub struct PostServiceDb<S> {
    store: S,
    limits: PageLimits,
}

impl<S: ContentStore> Svc for PostServiceDb<S> {}

impl<S: ContentStore> PostServiceDb<S> {
    pub fn new(store: S, limits: PageLimits) -> Self {
        Self { store, limits }
    }
}

fn validate_content(c: &PostContent) -> Result<()> {
    if c.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be blank".into()));
    }
    if c.title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title is longer than {MAX_TITLE_CHARS} characters"
        )));
    }
    if c.content.trim().is_empty() {
        return Err(AppError::Validation("content must not be blank".into()));
    }
    Ok(())
}

fn validate_image_refs(refs: &[String]) -> Result<()> {
    if refs.iter().any(|r| r.trim().is_empty()) {
        return Err(AppError::Validation("image reference must not be blank".into()));
    }
    Ok(())
}

fn images_by_post(images: Vec<Image>) -> HashMap<Uuid, Vec<Image>> {
    let mut grouped: HashMap<Uuid, Vec<Image>> = HashMap::new();
    for i in images {
        grouped.entry(i.post_id).or_default().push(i);
    }
    grouped
}

fn summaries(
    rows: Vec<PostWithOwner>,
    images: Vec<Image>,
    page: PageRequest,
    total: u64,
) -> Page<PostSummaryView> {
    let mut images = images_by_post(images);
    Page::new(rows, page, total).map(|(post, owner)| {
        let imgs = images.remove(&post.id).unwrap_or_default();
        PostSummaryView::new(post, owner.nickname, imgs)
    })
}

#[async_trait]
impl<S: ContentStore> PostService for PostServiceDb<S> {
    #[tracing::instrument(skip_all, fields(%owner, images = image_refs.len()))]
    async fn create_post(
        &self,
        content: PostContent,
        owner: Uuid,
        image_refs: Vec<String>,
    ) -> Result<PostView> {
        validate_content(&content).log_err("create_post")?;
        validate_image_refs(&image_refs).log_err("create_post")?;

        let new_post = NewPost::new(owner, content);
        let view = self
            .store
            .transaction(move |conn| {
                async move {
                    let user = conn
                        .find_user(owner)
                        .await?
                        .ok_or(AppError::NotFound("user", owner))?;
                    let post = conn.insert_post(new_post).await?;
                    let new_images = image_refs
                        .into_iter()
                        .map(|url| NewImage::new(post.id, url))
                        .collect();
                    let images = conn.insert_images(new_images).await?;
                    Ok(PostView::new(post, Some(user.nickname), images, Vec::new()))
                }
                .boxed()
            })
            .await
            .log_err("create_post")?;

        tracing::info!(post_id = %view.id, "post created");
        Ok(view)
    }

    #[tracing::instrument(skip_all, fields(page = page.page, size = ?page.size))]
    async fn list_main_page(&self, page: PageRequest) -> Result<Page<PostSummaryView>> {
        let page = self.limits.apply(page);
        self.store
            .read(move |conn| {
                async move {
                    let (rows, total) = conn.list_posts(page).await?;
                    let ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.id).collect();
                    let images = conn.images_for_posts(&ids).await?;
                    Ok(summaries(rows, images, page, total))
                }
                .boxed()
            })
            .await
            .log_err("list_main_page")
    }

    #[tracing::instrument(skip_all, fields(%nickname, page = page.page, size = ?page.size))]
    async fn list_by_owner_nickname(
        &self,
        nickname: &str,
        page: PageRequest,
    ) -> Result<Page<PostSummaryView>> {
        let page = self.limits.apply(page);
        let nickname = nickname.to_owned();
        self.store
            .read(move |conn| {
                async move {
                    let (rows, total) = conn.list_posts_by_nickname(&nickname, page).await?;
                    let ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.id).collect();
                    let images = conn.images_for_posts(&ids).await?;
                    Ok(summaries(rows, images, page, total))
                }
                .boxed()
            })
            .await
            .log_err("list_by_owner_nickname")
    }

    #[tracing::instrument(skip_all, fields(%post_id))]
    async fn get_post_detail(&self, post_id: Uuid) -> Result<PostDetailView> {
        self.store
            .read(move |conn| {
                async move {
                    let post = conn
                        .find_post(post_id)
                        .await?
                        .ok_or(AppError::NotFound("post", post_id))?;
                    let nickname = conn.find_user(post.user_id).await?.map(|u| u.nickname);
                    let images = conn.images_for_posts(&[post_id]).await?;
                    let comments = comment_tree::assemble(conn.comments_for_post(post_id).await?);
                    Ok(PostView::new(post, nickname, images, comments))
                }
                .boxed()
            })
            .await
            .log_err("get_post_detail")
    }

    #[tracing::instrument(skip_all, fields(%post_id, %acting_user))]
    async fn update_post(
        &self,
        post_id: Uuid,
        content: PostContent,
        acting_user: Uuid,
    ) -> Result<PostView> {
        validate_content(&content).log_err("update_post")?;

        self.store
            .transaction(move |conn| {
                async move {
                    let post = conn
                        .find_post_for_update(post_id)
                        .await?
                        .ok_or(AppError::NotFound("post", post_id))?;
                    if !post.is_owned_by(acting_user) {
                        return Err(AppError::Forbidden {
                            post_id,
                            user_id: acting_user,
                        });
                    }

                    let post = conn
                        .update_post_content(post_id, content.title, content.content)
                        .await?;
                    let nickname = conn.find_user(post.user_id).await?.map(|u| u.nickname);
                    let images = conn.images_for_posts(&[post_id]).await?;
                    let comments = comment_tree::assemble(conn.comments_for_post(post_id).await?);
                    Ok(PostView::new(post, nickname, images, comments))
                }
                .boxed()
            })
            .await
            .log_err("update_post")
    }

    #[tracing::instrument(skip_all, fields(%post_id, %acting_user))]
    async fn delete_post(&self, post_id: Uuid, acting_user: Uuid) -> Result<()> {
        self.store
            .transaction(move |conn| {
                async move {
                    let post = conn
                        .find_post_for_update(post_id)
                        .await?
                        .ok_or(AppError::NotFound("post", post_id))?;
                    if !post.is_owned_by(acting_user) {
                        return Err(AppError::Forbidden {
                            post_id,
                            user_id: acting_user,
                        });
                    }
                    conn.delete_post(post_id).await?;
                    Ok(())
                }
                .boxed()
            })
            .await
            .log_err("delete_post")?;

        tracing::info!("post deleted");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(%post_id, %acting_user))]
    async fn toggle_like(&self, post_id: Uuid, acting_user: Uuid) -> Result<i32> {
        let (toggled, count) = self
            .store
            .transaction(move |conn| {
                likes::toggle(conn, post_id, acting_user).boxed()
            })
            .await
            .log_err("toggle_like")?;

        tracing::debug!(liked = (toggled == Toggled::Liked), count, "like toggled");
        Ok(count)
    }
}
