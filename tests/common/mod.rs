#![allow(dead_code)]

use blog_service::models::post::PostContent;
use blog_service::pagination::PageLimits;
use blog_service::models::user::CreateUser;
use blog_service::services::comments::CommentServiceDb;
use blog_service::services::posts::{PostService, PostServiceDb};
use blog_service::services::users::{UserService, UserServiceDb};
use blog_service::store::{pg, ContentConn, ContentStore, MemoryStore, PgStore};
use blog_service::views::PostView;
use futures::FutureExt;
use uuid::Uuid;

pub const MAX_PAGE_SIZE: u32 = 50;

pub struct Fixture<S = MemoryStore> {
    pub store: S,
    pub posts: PostServiceDb<S>,
    pub comments: CommentServiceDb<S>,
    pub users: UserServiceDb<S>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Fixture<PgStore> {
    /// Connects to `DATABASE_URL` and applies migrations, or returns `None`
    /// when the variable is unset so the caller can skip.
    pub async fn postgres() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let migrate_url = url.clone();
        tokio::task::spawn_blocking(move || pg::run_migrations(&migrate_url))
            .await
            .expect("migration task")
            .expect("run migrations");
        let store = PgStore::connect(&url, 8).expect("connect to postgres");
        Some(Self::with_store(store))
    }
}

impl<S: ContentStore> Fixture<S> {
    pub fn with_store(store: S) -> Self {
        let limits = PageLimits {
            default_size: 10,
            max_size: MAX_PAGE_SIZE,
        };
        Self {
            posts: PostServiceDb::new(store.clone(), limits),
            comments: CommentServiceDb::new(store.clone()),
            users: UserServiceDb::new(store.clone(), limits),
            store,
        }
    }

    pub async fn user(&self, nickname: &str) -> Uuid {
        self.users
            .create_user(&CreateUser {
                nickname: nickname.to_string(),
            })
            .await
            .expect("create user")
            .id
    }

    pub async fn post(&self, owner: Uuid, title: &str, images: &[&str]) -> PostView {
        self.posts
            .create_post(
                content(title, "body"),
                owner,
                images.iter().map(|s| s.to_string()).collect(),
            )
            .await
            .expect("create post")
    }

    pub async fn like_rows(&self, post_id: Uuid) -> i64 {
        self.store
            .read(move |conn| async move { Ok(conn.count_likes(post_id).await?) }.boxed())
            .await
            .expect("count likes")
    }

    pub async fn stored_like_count(&self, post_id: Uuid) -> i32 {
        self.store
            .read(move |conn| {
                async move { Ok(conn.find_post(post_id).await?.map(|p| p.like_count)) }.boxed()
            })
            .await
            .expect("find post")
            .expect("post exists")
    }
}

pub fn content(title: &str, body: &str) -> PostContent {
    PostContent {
        title: title.to_string(),
        content: body.to_string(),
    }
}

/// A nickname that does not collide with rows left by earlier runs.
pub fn unique_nickname(prefix: &str) -> String {
    let suffix = Uuid::now_v7().simple().to_string();
    format!("{prefix}-{}", &suffix[20..])
}
