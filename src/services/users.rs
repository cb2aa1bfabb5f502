use axum::async_trait;
use futures::FutureExt;

use crate::error::{AppError, Result};
use crate::helpers::LogErr;
use crate::models::user::*;
use crate::pagination::{PageLimits, PageRequest};
use crate::store::{ContentConn, ContentStore};

use super::Svc;

pub const MAX_NICKNAME_CHARS: usize = 32;

#[async_trait]
pub trait UserService: Svc {
    async fn get_users(&self, page: PageRequest) -> Result<Vec<User>>;
    async fn create_user(&self, user: &CreateUser) -> Result<User>;
}

#[derive(Clone)]
pub struct UserServiceDb<S> {
    db: S,
    limits: PageLimits,
}

impl<S: ContentStore> Svc for UserServiceDb<S> {}

#[async_trait]
impl<S: ContentStore> UserService for UserServiceDb<S> {
    async fn get_users(&self, page: PageRequest) -> Result<Vec<User>> {
        let page = self.limits.apply(page);
        self.db
            .read(move |conn| async move { Ok(conn.list_users(page).await?) }.boxed())
            .await
            .log_err("get_users")
    }

    #[tracing::instrument(skip_all, fields(nickname = %u.nickname))]
    async fn create_user(&self, u: &CreateUser) -> Result<User> {
        let nickname = u.nickname.trim();
        if nickname.is_empty() || nickname.chars().count() > MAX_NICKNAME_CHARS {
            return Err(AppError::Validation(format!(
                "nickname must be 1 to {MAX_NICKNAME_CHARS} characters"
            )))
            .log_err("create_user");
        }

        let new_user = NewUser::from(CreateUser {
            nickname: nickname.to_owned(),
        });
        self.db
            .transaction(move |conn| async move { Ok(conn.insert_user(new_user).await?) }.boxed())
            .await
            .log_err("create_user")
    }
}

impl<S: ContentStore> UserServiceDb<S> {
    pub fn new(db: S, limits: PageLimits) -> Self {
        Self { db, limits }
    }
}
