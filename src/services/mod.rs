pub mod comment_tree;
pub mod comments;
pub mod likes;
pub mod posts;
pub mod users;

/// Marker for services shared as router state.
pub trait Svc: Clone + Send + Sync + 'static {}
