use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use axum_extra::TypedHeader;
use serde::Deserialize;
use uuid::Uuid;

use super::acting_user::{ActingUser, ActingUserHeader};
use crate::error::AppError;
use crate::models::post::PostContent;
use crate::pagination::{Page, PageRequest};
use crate::services::posts::PostService;
use crate::views::{LikeCountView, PostDetailView, PostSummaryView, PostView};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(flatten)]
    pub content: PostContent,
    #[serde(default)]
    pub images: Vec<String>,
}

async fn list_main_page<P: PostService>(
    State(svc): State<P>,
    WithRejection(Query(page), _): WithRejection<Query<PageRequest>, AppError>,
) -> Result<Json<Page<PostSummaryView>>, AppError> {
    Ok(Json(svc.list_main_page(page).await?))
}

async fn list_blog<P: PostService>(
    State(svc): State<P>,
    WithRejection(Path(nickname), _): WithRejection<Path<String>, AppError>,
    WithRejection(Query(page), _): WithRejection<Query<PageRequest>, AppError>,
) -> Result<Json<Page<PostSummaryView>>, AppError> {
    Ok(Json(svc.list_by_owner_nickname(&nickname, page).await?))
}

async fn create_post<P: PostService>(
    State(svc): State<P>,
    WithRejection(TypedHeader(ActingUser(user_id)), _): ActingUserHeader,
    WithRejection(Json(req), _): WithRejection<Json<CreatePostRequest>, AppError>,
) -> Result<(StatusCode, Json<PostView>), AppError> {
    let view = svc.create_post(req.content, user_id, req.images).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_post<P: PostService>(
    State(svc): State<P>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<PostDetailView>, AppError> {
    Ok(Json(svc.get_post_detail(post_id).await?))
}

async fn update_post<P: PostService>(
    State(svc): State<P>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(TypedHeader(ActingUser(user_id)), _): ActingUserHeader,
    WithRejection(Json(content), _): WithRejection<Json<PostContent>, AppError>,
) -> Result<Json<PostView>, AppError> {
    Ok(Json(svc.update_post(post_id, content, user_id).await?))
}

async fn delete_post<P: PostService>(
    State(svc): State<P>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(TypedHeader(ActingUser(user_id)), _): ActingUserHeader,
) -> Result<StatusCode, AppError> {
    svc.delete_post(post_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_like<P: PostService>(
    State(svc): State<P>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(TypedHeader(ActingUser(user_id)), _): ActingUserHeader,
) -> Result<Json<LikeCountView>, AppError> {
    let like_count = svc.toggle_like(post_id, user_id).await?;
    Ok(Json(LikeCountView { like_count }))
}

pub fn router<P: PostService>() -> Router<P> {
    Router::new()
        .route("/posts", get(list_main_page::<P>).post(create_post::<P>))
        .route(
            "/posts/:post_id",
            get(get_post::<P>)
                .put(update_post::<P>)
                .delete(delete_post::<P>),
        )
        .route("/posts/:post_id/likes", post(toggle_like::<P>))
        .route("/blogs/:nickname", get(list_blog::<P>))
}
