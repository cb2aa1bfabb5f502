//! Read models handed to request handlers. Plain data, serialized as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::comment::Comment;
use crate::models::image::Image;
use crate::models::post::Post;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub id: Uuid,
    pub image_url: String,
}

impl From<Image> for ImageView {
    fn from(i: Image) -> Self {
        Self {
            id: i.id,
            image_url: i.image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<CommentView>,
}

impl From<Comment> for CommentView {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            parent_comment_id: c.parent_comment_id,
            content: c.content,
            created_at: c.created_at,
            replies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nickname: Option<String>,
    pub title: String,
    pub content: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<ImageView>,
    pub comments: Vec<CommentView>,
}

impl PostView {
    pub fn new(
        post: Post,
        nickname: Option<String>,
        images: Vec<Image>,
        comments: Vec<CommentView>,
    ) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            nickname,
            title: post.title,
            content: post.content,
            like_count: post.like_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            images: images.into_iter().map(ImageView::from).collect(),
            comments,
        }
    }
}

/// The detail page carries the full view with the comment tree filled in.
pub type PostDetailView = PostView;

/// A post as shown in the main page and blog listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummaryView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nickname: String,
    pub title: String,
    pub content: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub images: Vec<ImageView>,
}

impl PostSummaryView {
    pub fn new(post: Post, nickname: String, images: Vec<Image>) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            nickname,
            title: post.title,
            content: post.content,
            like_count: post.like_count,
            created_at: post.created_at,
            images: images.into_iter().map(ImageView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeCountView {
    pub like_count: i32,
}
