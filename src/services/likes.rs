use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::like::NewLike;
use crate::store::ContentConn;

/// Whether a toggle added or removed the caller's like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Liked,
    Unliked,
}

/// Flips `user_id`'s like on `post_id` and returns the new counter.
///
/// Must run inside a unit of work: the post row is locked first, so the
/// lookup, the like row change and the counter update are atomic with
/// respect to other toggles on the same post.
pub async fn toggle<C>(conn: &mut C, post_id: Uuid, user_id: Uuid) -> Result<(Toggled, i32)>
where
    C: ContentConn + ?Sized,
{
    conn.find_post_for_update(post_id)
        .await?
        .ok_or(AppError::NotFound("post", post_id))?;
    conn.find_user(user_id)
        .await?
        .ok_or(AppError::NotFound("user", user_id))?;

    if conn.find_like(post_id, user_id).await?.is_some() {
        conn.delete_like(post_id, user_id).await?;
        let count = conn.adjust_like_count(post_id, -1).await?;
        Ok((Toggled::Unliked, count))
    } else {
        conn.insert_like(NewLike::new(post_id, user_id)).await?;
        let count = conn.adjust_like_count(post_id, 1).await?;
        Ok((Toggled::Liked, count))
    }
}
