use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::core::app::App;
use crate::models::{PostDraft, PostPatch, PostRecord};
use crate::store::StoreError;

/// 管理接口的统一错误响应
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

/// 校验 Bearer 凭证，凭证未配置时整组接口关闭
fn check_auth(app: &App, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = match app.config.admin_token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => {
            return Err(ApiError::new(
                StatusCode::FORBIDDEN,
                "管理接口未启用，请在 config.yml 配置 admin_token",
            ))
        }
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(()),
        _ => {
            warn!("管理接口收到无效凭证");
            Err(ApiError::new(StatusCode::UNAUTHORIZED, "凭证无效"))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub published: Option<bool>,
}

/// 列出文章，published=true 时过滤草稿
pub async fn list_posts(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PostRecord>>, ApiError> {
    check_auth(&app, &headers)?;
    let posts = app.repo.all_posts(params.published.unwrap_or(false)).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PostRecord>, ApiError> {
    check_auth(&app, &headers)?;
    match app.repo.post_by_id(&id).await? {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("文章不存在: {}", id),
        )),
    }
}

pub async fn create_post(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    check_auth(&app, &headers)?;
    let id = app.repo.create_post(draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_post(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<PostPatch>,
) -> Result<StatusCode, ApiError> {
    check_auth(&app, &headers)?;
    app.repo.update_post(&id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_post(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    check_auth(&app, &headers)?;
    app.repo.delete_post(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 上传封面图片，multipart 里取名为 file 的字段
pub async fn upload_image(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    check_auth(&app, &headers)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("读取上传内容失败: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.bin").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("读取上传内容失败: {}", e)))?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("上传内容为空"));
        }

        let url = app.repo.upload_image(&filename, bytes.to_vec()).await?;
        return Ok(Json(json!({ "url": url })));
    }

    Err(ApiError::bad_request("缺少 file 字段"))
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageBody {
    pub url: String,
}

pub async fn delete_image(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
    Json(body): Json<DeleteImageBody>,
) -> Result<StatusCode, ApiError> {
    check_auth(&app, &headers)?;
    app.repo.delete_image(&body.url).await?;
    Ok(StatusCode::NO_CONTENT)
}
