use axum::async_trait;
use futures::FutureExt;
use uuid::Uuid;

use super::Svc;
use crate::error::{AppError, Result};
use crate::helpers::LogErr;
use crate::models::comment::{CreateComment, NewComment};
use crate::store::{ContentConn, ContentStore};
use crate::views::CommentView;

#[async_trait]
pub trait CommentService: Svc {
    /// Adds a top-level comment, or a reply when `parent_comment_id` is set.
    async fn add_comment(
        &self,
        post_id: Uuid,
        acting_user: Uuid,
        comment: CreateComment,
    ) -> Result<CommentView>;
}

#[derive(Clone)]
pub struct CommentServiceDb<S> {
    store: S,
}

impl<S: ContentStore> Svc for CommentServiceDb<S> {}

impl<S: ContentStore> CommentServiceDb<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ContentStore> CommentService for CommentServiceDb<S> {
    #[tracing::instrument(
        skip_all,
        fields(%post_id, %acting_user, parent = ?comment.parent_comment_id)
    )]
    async fn add_comment(
        &self,
        post_id: Uuid,
        acting_user: Uuid,
        comment: CreateComment,
    ) -> Result<CommentView> {
        if comment.content.trim().is_empty() {
            return Err(AppError::Validation("comment must not be blank".into()))
                .log_err("add_comment");
        }

        self.store
            .transaction(move |conn| {
                async move {
                    conn.find_post(post_id)
                        .await?
                        .ok_or(AppError::NotFound("post", post_id))?;
                    conn.find_user(acting_user)
                        .await?
                        .ok_or(AppError::NotFound("user", acting_user))?;

                    if let Some(parent_id) = comment.parent_comment_id {
                        let parent = conn
                            .find_comment(parent_id)
                            .await?
                            .filter(|p| p.post_id == post_id)
                            .ok_or(AppError::NotFound("comment", parent_id))?;
                        // replies are one level deep
                        if !parent.is_top_level() {
                            return Err(AppError::Validation(
                                "cannot reply to a reply".into(),
                            ));
                        }
                    }

                    let saved = conn
                        .insert_comment(NewComment::new(post_id, acting_user, comment))
                        .await?;
                    Ok(CommentView::from(saved))
                }
                .boxed()
            })
            .await
            .log_err("add_comment")
    }
}
