use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum_extra::typed_header::TypedHeaderRejection;
use diesel::result::DatabaseErrorKind;
use diesel_async::pooled_connection::deadpool::PoolError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Failures raised by a content store. Never retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("connection pool: {0}")]
    Pool(#[from] PoolError),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StoreError::Query(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _
            ))
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} {1} not found")]
    NotFound(&'static str, Uuid),

    #[error("user {user_id} may not modify post {post_id}")]
    Forbidden { post_id: Uuid, user_id: Uuid },

    #[error("validation failed: {0}")]
    Validation(String),

    /// The request could not be extracted (bad header, path, query or body).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Store(e.into())
    }
}

impl From<PoolError> for AppError {
    fn from(e: PoolError) -> Self {
        Self::Store(e.into())
    }
}

impl From<TypedHeaderRejection> for AppError {
    fn from(r: TypedHeaderRejection) -> Self {
        Self::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: r.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(r: JsonRejection) -> Self {
        Self::Rejected {
            status: r.status(),
            message: r.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(r: PathRejection) -> Self {
        Self::Rejected {
            status: r.status(),
            message: r.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(r: QueryRejection) -> Self {
        Self::Rejected {
            status: r.status(),
            message: r.body_text(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected { status, .. } => *status,
            AppError::Store(e) if e.is_unique_violation() => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        // store details stay in the logs
        let message = match &self {
            AppError::Store(e) if !e.is_unique_violation() => "internal store failure".to_string(),
            AppError::Store(_) => "resource already exists".to_string(),
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
