use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// the input to our `create_user` handler
#[derive(Deserialize, Debug, Clone)]
pub struct CreateUser {
    pub nickname: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    pub id: Uuid,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

impl From<CreateUser> for NewUser {
    fn from(u: CreateUser) -> Self {
        Self {
            id: Uuid::now_v7(),
            nickname: u.nickname,
            created_at: Utc::now(),
        }
    }
}

// the output to our `create_user` handler
#[derive(Serialize, Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}
