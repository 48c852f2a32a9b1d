use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::core::app::App;
use crate::core::feed;
use crate::core::search::{self, SearchIndexBuilder};
use crate::models::SearchQuery;
use crate::widgets::pagination::DEFAULT_WINDOW;
use crate::widgets::{Pagination, SearchForm, ShareLinks};

/// 模板渲染失败时兜底的纯静态页面
const FALLBACK_ERROR_HTML: &str = "<h1>出错了</h1><p>服务暂时不可用，请稍后重试。</p>";

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    pub page: Option<usize>,
}

/// 所有页面共享的模板上下文
fn base_context(app: &App) -> tera::Context {
    let config = &app.config;
    let mut context = tera::Context::new();
    context.insert(
        "site",
        &json!({
            "config": {
                "title": config.title,
                "subtitle": config.subtitle,
                "description": config.description,
                "author": config.author,
                "language": config.language(),
                "url": config.site_url(),
                "root": "/",
                "theme": config.theme_name(),
            },
            "title": config.title,
            "url": config.site_url(),
        }),
    );
    context.insert("now", &Utc::now().to_rfc3339());
    context
}

fn render(app: &App, template: &str, context: &tera::Context) -> anyhow::Result<String> {
    app.renderer
        .read()
        .unwrap()
        .render_template(template, context)
}

/// 渲染错误页，页面上保留重试入口
fn error_page(app: &App, err: anyhow::Error) -> Response {
    error!("页面处理失败: {}", err);
    let mut context = base_context(app);
    context.insert("message", "内容加载失败，请稍后重试。");
    match render(app, "error.html", &context) {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(e) => {
            error!("渲染错误页失败: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(FALLBACK_ERROR_HTML.to_string()),
            )
                .into_response()
        }
    }
}

fn not_found_page(app: &App) -> Response {
    let context = base_context(app);
    match render(app, "404.html", &context) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            error!("渲染 404 页失败: {}", e);
            (StatusCode::NOT_FOUND, Html("<h1>404</h1>".to_string())).into_response()
        }
    }
}

/// 首页：精选文章加分页的最新文章
pub async fn index(State(app): State<Arc<App>>, Query(params): Query<IndexParams>) -> Response {
    let page = params.page.unwrap_or(1).max(1);

    let posts = match app.repo.all_posts(true).await {
        Ok(posts) => posts,
        Err(e) => return error_page(&app, e.into()),
    };

    // 精选区只出现在第一页
    let featured = if page == 1 {
        match app.repo.featured_posts(app.config.featured).await {
            Ok(featured) => featured,
            Err(e) => return error_page(&app, e.into()),
        }
    } else {
        Vec::new()
    };

    let per_page = app.config.per_page();
    let total_pages = posts.len().div_ceil(per_page);
    let page = if total_pages > 0 {
        page.min(total_pages)
    } else {
        1
    };
    let page_posts: Vec<_> = posts.iter().skip((page - 1) * per_page).take(per_page).collect();

    let window = app.config.pagination_window.unwrap_or(DEFAULT_WINDOW);
    let pagination = Pagination::with_window(page, total_pages, window);

    let mut context = base_context(&app);
    context.insert("posts", &page_posts);
    context.insert("featured", &featured);
    context.insert("pagination", &pagination);

    match render(&app, "index.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&app, e),
    }
}

/// 文章页：渲染正文并累加浏览量
pub async fn post_page(State(app): State<Arc<App>>, Path(slug): Path<String>) -> Response {
    let post = match app.repo.post_by_slug(&slug).await {
        Ok(Some(post)) => post,
        Ok(None) => return not_found_page(&app),
        Err(e) => return error_page(&app, e.into()),
    };

    // 计数失败不影响文章展示
    if let Err(e) = app.repo.increment_view_count(&post.id).await {
        warn!("浏览计数未更新 ({}): {}", post.id, e);
    }

    let page_url = format!(
        "{}/posts/{}",
        app.config.site_url().trim_end_matches('/'),
        post.slug
    );
    let share = ShareLinks::build(
        &page_url,
        &post.title,
        post.excerpt.as_deref(),
        post.cover_image.as_deref(),
    );

    let mut context = base_context(&app);
    context.insert("post", &post);
    context.insert("share", &share);

    match render(&app, "post.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&app, e),
    }
}

/// 分类总览页
pub async fn categories_page(State(app): State<Arc<App>>) -> Response {
    let categories = match app.repo.categories_with_counts().await {
        Ok(categories) => categories,
        Err(e) => return error_page(&app, e.into()),
    };

    let mut context = base_context(&app);
    context.insert("categories", &categories);
    match render(&app, "categories.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&app, e),
    }
}

/// 单个分类下的文章列表，分类用别名定位
pub async fn category_page(State(app): State<Arc<App>>, Path(slug): Path<String>) -> Response {
    let summaries = match app.repo.categories_with_counts().await {
        Ok(summaries) => summaries,
        Err(e) => return error_page(&app, e.into()),
    };
    let summary = match summaries.into_iter().find(|s| s.slug == slug) {
        Some(summary) => summary,
        None => return not_found_page(&app),
    };

    let posts = match app.repo.posts_by_category(&summary.name).await {
        Ok(posts) => posts,
        Err(e) => return error_page(&app, e.into()),
    };

    let mut context = base_context(&app);
    context.insert("category", &summary);
    context.insert("posts", &posts);
    match render(&app, "category.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&app, e),
    }
}

/// 搜索页：关键词、分类和排序都在查询串里
pub async fn search_page(
    State(app): State<Arc<App>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let query = query.normalized();

    let posts = match app.repo.all_posts(true).await {
        Ok(posts) => posts,
        Err(e) => return error_page(&app, e.into()),
    };
    let results = search::apply_query(&posts, &query);

    let categories = match app.repo.all_categories().await {
        Ok(categories) => categories,
        Err(e) => return error_page(&app, e.into()),
    };

    let form = SearchForm::from_query(&query);

    let mut context = base_context(&app);
    context.insert("results", &results);
    context.insert("categories", &categories);
    context.insert("form", &form);
    match render(&app, "search.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_page(&app, e),
    }
}

/// 快速搜索用的 JSON 索引
pub async fn search_index(State(app): State<Arc<App>>) -> Response {
    if !app.config.search.as_ref().map_or(true, |s| s.enable) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let use_full_content = app.config.search.as_ref().map_or(false, |s| s.content);

    let posts = match app.repo.all_posts(true).await {
        Ok(posts) => posts,
        Err(e) => return error_page(&app, e.into()),
    };

    match SearchIndexBuilder::new(use_full_content).build(&posts) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => error_page(&app, e),
    }
}

pub async fn rss_feed(State(app): State<Arc<App>>) -> Response {
    if !app.config.feed.as_ref().map_or(true, |f| f.enable) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let posts = match app.repo.all_posts(true).await {
        Ok(posts) => posts,
        Err(e) => return error_page(&app, e.into()),
    };
    match feed::build_rss(&app.config, &posts) {
        Ok(xml) => (
            [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Err(e) => error_page(&app, e),
    }
}

pub async fn atom_feed(State(app): State<Arc<App>>) -> Response {
    if !app.config.feed.as_ref().map_or(true, |f| f.enable) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let posts = match app.repo.all_posts(true).await {
        Ok(posts) => posts,
        Err(e) => return error_page(&app, e.into()),
    };
    match feed::build_atom(&app.config, &posts) {
        Ok(xml) => (
            [(header::CONTENT_TYPE, "application/atom+xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Err(e) => error_page(&app, e),
    }
}

/// 兜底的 404 处理器
pub async fn not_found(State(app): State<Arc<App>>) -> Response {
    not_found_page(&app)
}
