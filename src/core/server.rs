use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::app::App;
use crate::core::{api, pages};
use crate::theme::default as default_theme;

/// HTTP 服务器
pub struct Server {
    /// 共享的站点应用
    app: Arc<App>,
    /// 端口
    port: u16,
}

impl Server {
    /// 创建新的服务器
    pub fn new(app: Arc<App>, port: u16) -> Self {
        Self { app, port }
    }

    /// 组装站点路由：页面、管理接口和静态资源
    pub fn router(&self) -> Router {
        let api_routes = Router::new()
            .route("/posts", get(api::list_posts).post(api::create_post))
            .route(
                "/posts/:id",
                get(api::get_post)
                    .patch(api::update_post)
                    .delete(api::delete_post),
            )
            .route("/images", post(api::upload_image).delete(api::delete_image));

        let mut router = Router::new()
            .route("/", get(pages::index))
            .route("/posts/:slug", get(pages::post_page))
            .route("/categories", get(pages::categories_page))
            .route("/categories/:slug", get(pages::category_page))
            .route("/search", get(pages::search_page))
            .route("/search.json", get(pages::search_index))
            .route("/rss.xml", get(pages::rss_feed))
            .route("/atom.xml", get(pages::atom_feed))
            .nest("/api", api_routes);

        // 内置主题没有磁盘资源，样式和脚本直接从二进制里取
        if self.app.renderer.read().unwrap().embedded {
            router = router
                .route("/assets/css/style.css", get(embedded_style))
                .route("/assets/js/site.js", get(embedded_script));
        } else {
            router = router.nest_service("/assets", ServeDir::new(self.app.theme_assets_dir()));
        }

        router
            .nest_service("/media", ServeDir::new(self.app.media_dir()))
            .fallback(pages::not_found)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(self.app.clone())
    }

    /// 启动服务器
    pub async fn start(self) -> Result<()> {
        let router = self.router();

        let addr: SocketAddr = format!("0.0.0.0:{}", self.port).parse()?;
        info!("Server started at http://localhost:{}", self.port);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

async fn embedded_style() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        default_theme::STYLE_CSS,
    )
}

async fn embedded_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        default_theme::SITE_JS,
    )
}
