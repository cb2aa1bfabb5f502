use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::post::Post;

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewImage {
    pub id: Uuid,
    pub post_id: Uuid,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl NewImage {
    pub fn new(post_id: Uuid, image_url: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            post_id,
            image_url,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(belongs_to(Post))]
#[diesel(table_name = crate::schema::images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Image {
    pub id: Uuid,
    pub post_id: Uuid,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}
