pub mod comment;
pub mod image;
pub mod like;
pub mod post;
pub mod user;
