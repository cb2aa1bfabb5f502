//! Two-level comment tree for the post detail page.
//!
//! A comment is top-level when it has no parent. Its replies are the
//! comments whose parent is that comment. Input order (creation order) is
//! kept for both levels.
//!
//! An earlier revision picked top-level comments by "has no children" and
//! matched replies by post id, which attached every comment of the post as a
//! reply and dropped any comment that had replies. The partition below is by
//! parent id; see `regression_parent_with_replies_stays_top_level`.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::comment::Comment;
use crate::views::CommentView;

pub fn assemble(comments: Vec<Comment>) -> Vec<CommentView> {
    let mut replies: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    let mut top_level = Vec::new();

    for c in comments {
        match c.parent_comment_id {
            None => top_level.push(CommentView::from(c)),
            Some(parent) => replies.entry(parent).or_default().push(CommentView::from(c)),
        }
    }

    // replies to replies have no place in a two-level tree and are left out
    for view in &mut top_level {
        if let Some(children) = replies.remove(&view.id) {
            view.replies = children;
        }
    }

    top_level
}
