//! Blog content service: posts with images, two-level comment threads and
//! like toggling over a transactional content store.

pub mod config;
pub mod error;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;
pub mod views;

use axum::Router;
use tower_http::compression::CompressionLayer;

use crate::config::AppCfg;
use crate::middleware::cors::CorsExt;
use crate::middleware::logging::HttpLoggingExt;
use crate::services::comments::CommentServiceDb;
use crate::services::posts::PostServiceDb;
use crate::services::users::UserServiceDb;
use crate::store::ContentStore;

/// Builds the HTTP application over `store`.
pub fn app<S: ContentStore>(store: S, cfg: &AppCfg) -> Router {
    let post_svc = PostServiceDb::new(store.clone(), cfg.page_limits());
    let comment_svc = CommentServiceDb::new(store.clone());
    let user_svc = UserServiceDb::new(store, cfg.page_limits());

    let api = Router::new()
        .merge(routes::posts::router().with_state(post_svc))
        .merge(routes::comments::router().with_state(comment_svc))
        .merge(routes::users::router().with_state(user_svc));

    Router::new()
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .with_cors(&cfg.cors_allowed_origins)
        .with_http_logging()
}
