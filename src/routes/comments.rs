use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use axum_extra::TypedHeader;
use uuid::Uuid;

use super::acting_user::{ActingUser, ActingUserHeader};
use crate::error::AppError;
use crate::models::comment::CreateComment;
use crate::services::comments::CommentService;
use crate::views::CommentView;

async fn add_comment<C: CommentService>(
    State(svc): State<C>,
    WithRejection(Path(post_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(TypedHeader(ActingUser(user_id)), _): ActingUserHeader,
    WithRejection(Json(payload), _): WithRejection<Json<CreateComment>, AppError>,
) -> Result<(StatusCode, Json<CommentView>), AppError> {
    let comment = svc.add_comment(post_id, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub fn router<C: CommentService>() -> Router<C> {
    Router::new().route("/posts/:post_id/comments", post(add_comment::<C>))
}
