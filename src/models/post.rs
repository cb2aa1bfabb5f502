use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title and body of a post. Updates replace both.
#[derive(Debug, Clone, Deserialize)]
pub struct PostContent {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(owner: Uuid, content: PostContent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id: owner,
            title: content.title,
            content: content.content,
            like_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    /// Mirrors the number of `likes` rows for this post.
    pub like_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}
