mod common;

use blog_service::error::AppError;
use blog_service::pagination::PageRequest;
use blog_service::services::comments::CommentService;
use blog_service::services::posts::PostService;
use blog_service::store::{ContentConn, ContentStore};
use common::{content, Fixture};
use futures::FutureExt;
use uuid::Uuid;

#[tokio::test]
async fn create_post_records_images_and_empty_comments() {
    let fx = Fixture::new();
    let owner = fx.user("ann").await;

    let view = fx.post(owner, "first", &["a.png", "b.png"]).await;

    assert_eq!(view.user_id, owner);
    assert_eq!(view.nickname.as_deref(), Some("ann"));
    assert_eq!(view.like_count, 0);
    assert!(view.comments.is_empty());
    let urls: Vec<_> = view.images.iter().map(|i| i.image_url.as_str()).collect();
    assert_eq!(urls, vec!["a.png", "b.png"]);

    let detail = fx.posts.get_post_detail(view.id).await.unwrap();
    assert_eq!(detail.images, view.images);
}

#[tokio::test]
async fn create_post_by_unknown_user_is_not_found() {
    let fx = Fixture::new();
    let stranger = Uuid::now_v7();

    let err = fx
        .posts
        .create_post(content("t", "c"), stranger, vec!["a.png".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("user", id) if id == stranger));

    let page = fx.posts.list_main_page(PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn create_post_validates_before_touching_the_store() {
    let fx = Fixture::new();
    let owner = fx.user("ann").await;

    let err = fx
        .posts
        .create_post(content("", "c"), owner, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = fx
        .posts
        .create_post(content("t", "c"), owner, vec!["".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn main_page_lists_newest_first_with_images() {
    let fx = Fixture::new();
    let ann = fx.user("ann").await;
    let bob = fx.user("bob").await;

    let p1 = fx.post(ann, "one", &["1.png"]).await;
    let p2 = fx.post(bob, "two", &[]).await;
    let p3 = fx.post(ann, "three", &["3a.png", "3b.png"]).await;

    let page = fx.posts.list_main_page(PageRequest::new(0, 2)).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages(), 2);
    let ids: Vec<_> = page.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![p3.id, p2.id]);
    assert_eq!(page.items[0].images.len(), 2);
    assert_eq!(page.items[0].nickname, "ann");
    assert!(page.items[1].images.is_empty());

    let page = fx.posts.list_main_page(PageRequest::new(1, 2)).await.unwrap();
    let ids: Vec<_> = page.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![p1.id]);
    assert_eq!(page.items[0].images[0].image_url, "1.png");
}

#[tokio::test]
async fn oversized_page_is_clamped() {
    let fx = Fixture::new();
    let page = fx
        .posts
        .list_main_page(PageRequest::new(0, 10_000))
        .await
        .unwrap();
    assert_eq!(page.size, common::MAX_PAGE_SIZE);
}

#[tokio::test]
async fn blog_listing_filters_by_owner_nickname() {
    let fx = Fixture::new();
    let ann = fx.user("ann").await;
    let bob = fx.user("bob").await;

    let a1 = fx.post(ann, "a1", &[]).await;
    fx.post(bob, "b1", &[]).await;
    let a2 = fx.post(ann, "a2", &[]).await;

    let page = fx
        .posts
        .list_by_owner_nickname("ann", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    let ids: Vec<_> = page.items.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![a2.id, a1.id]);

    let page = fx
        .posts
        .list_by_owner_nickname("nobody", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn detail_of_missing_post_is_not_found() {
    let fx = Fixture::new();
    let id = Uuid::now_v7();
    let err = fx.posts.get_post_detail(id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("post", missing) if missing == id));
}

#[tokio::test]
async fn owner_replaces_all_content_fields() {
    let fx = Fixture::new();
    let ann = fx.user("ann").await;
    let post = fx.post(ann, "draft", &["a.png"]).await;

    let updated = fx
        .posts
        .update_post(post.id, content("final", "new body"), ann)
        .await
        .unwrap();

    assert_eq!(updated.title, "final");
    assert_eq!(updated.content, "new body");
    assert_eq!(updated.images.len(), 1);
    assert!(updated.updated_at >= post.updated_at);

    let detail = fx.posts.get_post_detail(post.id).await.unwrap();
    assert_eq!(detail.title, "final");
    assert_eq!(detail.content, "new body");
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete() {
    let fx = Fixture::new();
    let ann = fx.user("ann").await;
    let bob = fx.user("bob").await;
    let post = fx.post(ann, "mine", &[]).await;

    let err = fx
        .posts
        .update_post(post.id, content("hijacked", "x"), bob)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    let err = fx.posts.delete_post(post.id, bob).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    let detail = fx.posts.get_post_detail(post.id).await.unwrap();
    assert_eq!(detail.title, "mine");
    assert_eq!(detail.content, "body");
}

#[tokio::test]
async fn update_and_delete_of_missing_post_are_not_found() {
    let fx = Fixture::new();
    let ann = fx.user("ann").await;
    let id = Uuid::now_v7();

    let err = fx
        .posts
        .update_post(id, content("t", "c"), ann)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));

    let err = fx.posts.delete_post(id, ann).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));
}

#[tokio::test]
async fn delete_cascades_to_images_comments_and_likes() {
    let fx = Fixture::new();
    let ann = fx.user("ann").await;
    let bob = fx.user("bob").await;
    let post = fx.post(ann, "doomed", &["a.png", "b.png"]).await;
    let other = fx.post(ann, "survivor", &["c.png"]).await;

    let top = fx
        .comments
        .add_comment(
            post.id,
            bob,
            blog_service::models::comment::CreateComment {
                content: "hi".into(),
                parent_comment_id: None,
            },
        )
        .await
        .unwrap();
    fx.comments
        .add_comment(
            post.id,
            ann,
            blog_service::models::comment::CreateComment {
                content: "hello".into(),
                parent_comment_id: Some(top.id),
            },
        )
        .await
        .unwrap();
    fx.posts.toggle_like(post.id, bob).await.unwrap();

    fx.posts.delete_post(post.id, ann).await.unwrap();

    let post_id = post.id;
    let (images, comments, likes) = fx
        .store
        .read(move |conn| {
            async move {
                let images = conn.images_for_posts(&[post_id]).await?;
                let comments = conn.comments_for_post(post_id).await?;
                let likes = conn.count_likes(post_id).await?;
                Ok((images, comments, likes))
            }
            .boxed()
        })
        .await
        .unwrap();
    assert!(images.is_empty());
    assert!(comments.is_empty());
    assert_eq!(likes, 0);

    assert!(matches!(
        fx.posts.get_post_detail(post.id).await,
        Err(AppError::NotFound(..))
    ));
    let survivor = fx.posts.get_post_detail(other.id).await.unwrap();
    assert_eq!(survivor.images.len(), 1);
}
