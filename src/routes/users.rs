use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;

use crate::error::AppError;
use crate::models::user::{CreateUser, User};
use crate::pagination::PageRequest;
use crate::services::users::UserService;

async fn get_users<S: UserService>(
    State(usersvc): State<S>,
    WithRejection(Query(page), _): WithRejection<Query<PageRequest>, AppError>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = usersvc.get_users(page).await?;
    Ok(Json(users))
}

async fn create_user<S: UserService>(
    State(usersvc): State<S>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateUser>, AppError>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = usersvc.create_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub fn router<UserSvc: UserService>() -> Router<UserSvc> {
    Router::new().route(
        "/users",
        get(get_users::<UserSvc>).post(create_user::<UserSvc>),
    )
}
