pub mod acting_user;
pub mod comments;
pub mod posts;
pub mod users;
