use std::sync::Arc;
use std::time::Duration;

use rust_aniverse::models::{Author, PostDraft, PostPatch};
use rust_aniverse::store::LocalStore;
use rust_aniverse::ContentRepository;

fn new_repo() -> ContentRepository {
    let store = Arc::new(LocalStore::in_memory());
    ContentRepository::new(store.clone(), store)
}

fn sample_draft(title: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        slug: None,
        content: format!("# {}\n\n这里是{}的正文。", title, title),
        excerpt: None,
        cover_image: None,
        categories: vec!["新番速递".to_string()],
        author: Author {
            name: "小编".to_string(),
            image: None,
        },
        published: true,
    }
}

#[tokio::test]
async fn create_assigns_server_side_defaults() {
    let repo = new_repo();
    let id = repo
        .create_post(sample_draft("进击的巨人 最终季"))
        .await
        .unwrap();

    let post = repo.post_by_id(&id).await.unwrap().unwrap();
    assert_eq!(post.view_count, 0);
    assert_eq!(post.slug, "jin-ji-de-ju-ren-zui-zhong-ji");
    assert_eq!(post.created_at, post.updated_at);
    assert!(post.published);
}

#[tokio::test]
async fn explicit_slug_wins_over_title() {
    let repo = new_repo();
    let mut draft = sample_draft("莉可丽丝");
    draft.slug = Some("  lycoris-recoil  ".to_string());
    let id = repo.create_post(draft).await.unwrap();

    let post = repo.post_by_id(&id).await.unwrap().unwrap();
    assert_eq!(post.slug, "lycoris-recoil");
}

#[tokio::test]
async fn slug_lookup_returns_none_for_missing() {
    let repo = new_repo();
    repo.create_post(sample_draft("命运石之门")).await.unwrap();

    assert!(repo
        .post_by_slug("ming-yun-shi-zhi-men")
        .await
        .unwrap()
        .is_some());
    assert!(repo.post_by_slug("bu-cun-zai").await.unwrap().is_none());
    assert!(repo.post_by_id("missing-id").await.unwrap().is_none());
}

#[tokio::test]
async fn update_touches_only_supplied_fields() {
    let repo = new_repo();
    let id = repo
        .create_post(sample_draft("四月是你的谎言"))
        .await
        .unwrap();
    let before = repo.post_by_id(&id).await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    let patch = PostPatch {
        title: Some("四月是你的谎言（补完）".to_string()),
        ..Default::default()
    };
    repo.update_post(&id, patch).await.unwrap();

    let after = repo.post_by_id(&id).await.unwrap().unwrap();
    assert_eq!(after.title, "四月是你的谎言（补完）");
    assert_eq!(after.content, before.content);
    assert_eq!(after.slug, before.slug);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);

    // 空补丁同样会刷新更新时间
    tokio::time::sleep(Duration::from_millis(5)).await;
    repo.update_post(&id, PostPatch::default()).await.unwrap();
    let again = repo.post_by_id(&id).await.unwrap().unwrap();
    assert!(again.updated_at > after.updated_at);
    assert_eq!(again.title, after.title);
}

#[tokio::test]
async fn published_filter_and_recent_order() {
    let repo = new_repo();
    repo.create_post(sample_draft("旧文章")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let mut hidden = sample_draft("未发布的草稿");
    hidden.published = false;
    repo.create_post(hidden).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    repo.create_post(sample_draft("新文章")).await.unwrap();

    let published = repo.all_posts(true).await.unwrap();
    let titles: Vec<_> = published.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["新文章", "旧文章"]);

    let everything = repo.all_posts(false).await.unwrap();
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn delete_post_keeps_uploaded_cover() {
    let repo = new_repo();

    let url = repo
        .upload_image("cover.png", b"png bytes".to_vec())
        .await
        .unwrap();
    let mut draft = sample_draft("带封面的文章");
    draft.cover_image = Some(url.clone());
    let id = repo.create_post(draft).await.unwrap();

    repo.delete_post(&id).await.unwrap();
    assert!(repo.post_by_id(&id).await.unwrap().is_none());

    // 封面不会被级联删除，之后还能单独删掉
    repo.delete_image(&url).await.unwrap();
}

#[tokio::test]
async fn category_listing_requires_published_and_membership() {
    let repo = new_repo();
    let mut first = sample_draft("热血番一号");
    first.categories = vec!["热血".to_string()];
    repo.create_post(first).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let mut second = sample_draft("热血番二号");
    second.categories = vec!["热血".to_string(), "奇幻".to_string()];
    second.published = false;
    repo.create_post(second).await.unwrap();

    let hot = repo.posts_by_category("热血").await.unwrap();
    assert_eq!(hot.len(), 1);
    assert_eq!(hot[0].title, "热血番一号");

    assert!(repo
        .posts_by_category("不存在的分类")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn image_upload_yields_public_url() {
    let repo = new_repo();
    let url = repo
        .upload_image("封面 v2.png", b"bytes".to_vec())
        .await
        .unwrap();
    assert!(url.starts_with("/media/covers/"));
    assert!(url.ends_with(".png"));

    repo.delete_image(&url).await.unwrap();
    // 外部图片地址直接忽略
    repo.delete_image("https://cdn.example.com/banner.jpg")
        .await
        .unwrap();
}
