use std::sync::Arc;
use std::time::Duration;

use axum::body::to_bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use rust_aniverse::core::pages::{self, IndexParams};
use rust_aniverse::models::{Author, Config, PostDraft, SearchQuery};
use rust_aniverse::store::LocalStore;
use rust_aniverse::{App, ContentRepository};

fn test_app() -> Arc<App> {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalStore::in_memory());
    let app = App::with_stores(
        dir.path().to_path_buf(),
        Config::default(),
        store.clone(),
        store,
    )
    .unwrap();
    Arc::new(app)
}

fn draft(title: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        slug: None,
        content: format!("# {}\n\n正文内容。", title),
        excerpt: Some(format!("{} 的摘要", title)),
        cover_image: None,
        categories: vec!["新番速递".to_string()],
        author: Author {
            name: "小编".to_string(),
            image: None,
        },
        published: true,
    }
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn index_page_renders_posts() {
    let app = test_app();
    app.repo.create_post(draft("进击的巨人")).await.unwrap();

    let response = pages::index(State(app.clone()), Query(IndexParams { page: None })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("进击的巨人"));
    assert!(html.contains("Aniverse"));
    assert!(html.contains("本周热门"));
}

#[tokio::test]
async fn index_second_page_drops_featured_section() {
    let app = test_app();
    for i in 0..8 {
        app.repo
            .create_post(draft(&format!("第{}篇文章", i)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let response = pages::index(State(app.clone()), Query(IndexParams { page: Some(2) })).await;
    assert_eq!(response.status(), StatusCode::OK);

    // 默认每页 6 篇，第二页只剩最早的两篇，且没有精选区
    let html = body_text(response).await;
    assert!(html.contains("第0篇文章"));
    assert!(html.contains("第1篇文章"));
    assert!(!html.contains("第7篇文章"));
    assert!(!html.contains("本周热门"));
}

#[tokio::test]
async fn post_page_counts_views_and_404s_unknown_slug() {
    let app = test_app();
    let id = app.repo.create_post(draft("夏日重现")).await.unwrap();
    let post = app.repo.post_by_id(&id).await.unwrap().unwrap();

    let response = pages::post_page(State(app.clone()), Path(post.slug.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("夏日重现"));
    assert!(html.contains("twitter.com/intent/tweet"));

    let after = app.repo.post_by_id(&id).await.unwrap().unwrap();
    assert_eq!(after.view_count, 1);

    let response = pages::post_page(State(app.clone()), Path("missing".to_string())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_page_filters_by_term() {
    let app = test_app();
    app.repo.create_post(draft("命运石之门")).await.unwrap();
    app.repo.create_post(draft("紫罗兰永恒花园")).await.unwrap();

    let query = SearchQuery {
        term: "石之门".to_string(),
        ..Default::default()
    };
    let response = pages::search_page(State(app.clone()), Query(query)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("命运石之门"));
    assert!(!html.contains("紫罗兰永恒花园"));
}

#[tokio::test]
async fn category_pages_render_and_404_on_unknown() {
    let app = test_app();
    app.repo.create_post(draft("鬼灭之刃")).await.unwrap();

    let response = pages::categories_page(State(app.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("新番速递"));

    let response = pages::category_page(State(app.clone()), Path("xin-fan-su-di".to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("鬼灭之刃"));

    let response = pages::category_page(State(app.clone()), Path("wu-ming".to_string())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feeds_and_search_index_respond() {
    let app = test_app();
    app.repo.create_post(draft("孤独摇滚")).await.unwrap();

    let response = pages::rss_feed(State(app.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("孤独摇滚"));

    let response = pages::atom_feed(State(app.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = pages::search_index(State(app.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("gu-du-yao-gun"));
}

#[tokio::test]
async fn disabled_feed_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.feed = Some(rust_aniverse::models::FeedConfig {
        enable: false,
        limit: 20,
    });
    let store = Arc::new(LocalStore::in_memory());
    let app = Arc::new(
        App::with_stores(dir.path().to_path_buf(), config, store.clone(), store).unwrap(),
    );

    let response = pages::rss_feed(State(app.clone())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = pages::atom_feed(State(app)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn persistent_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let media_dir = dir.path().join("media");

    let id = {
        let store = Arc::new(LocalStore::open(&data_dir, &media_dir, "/media").unwrap());
        let repo = ContentRepository::new(store.clone(), store);
        repo.create_post(draft("持久化测试")).await.unwrap()
    };

    let store = Arc::new(LocalStore::open(&data_dir, &media_dir, "/media").unwrap());
    let repo = ContentRepository::new(store.clone(), store);
    let post = repo.post_by_id(&id).await.unwrap().unwrap();
    assert_eq!(post.title, "持久化测试");
}

#[tokio::test]
async fn import_skips_existing_slugs() {
    let dir = tempfile::tempdir().unwrap();
    let content_dir = dir.path().join("content");
    std::fs::create_dir_all(&content_dir).unwrap();
    std::fs::write(
        content_dir.join("first.md"),
        "---\ntitle: 导入测试\nslug: import-test\ncategories:\n  - 站务\n---\n\n正文第一行。\n",
    )
    .unwrap();

    let store = Arc::new(LocalStore::in_memory());
    let app =
        App::with_stores(dir.path().to_path_buf(), Config::default(), store.clone(), store)
            .unwrap();

    assert_eq!(app.import_content().await.unwrap(), 1);
    assert_eq!(app.import_content().await.unwrap(), 0);

    let post = app.repo.post_by_slug("import-test").await.unwrap().unwrap();
    assert_eq!(post.title, "导入测试");
    assert_eq!(post.categories, vec!["站务"]);
}

#[test]
fn config_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yml");

    let mut config = Config::default();
    config.title = "萌站".to_string();
    config.per_page = Some(9);
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.title, "萌站");
    assert_eq!(loaded.per_page(), 9);
}
