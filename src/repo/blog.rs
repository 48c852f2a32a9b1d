use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};

use crate::models::{CategorySummary, PostDraft, PostPatch, PostRecord};
use crate::store::{
    BlobStore, Direction, Document, DocumentStore, Filter, Query, StoreError, StoreResult,
};
use crate::utils;

/// 文章所在的集合名
const POSTS_COLLECTION: &str = "posts";
/// 封面图片上传到的目录
const COVERS_FOLDER: &str = "covers";
/// 精选文章的默认数量
const DEFAULT_FEATURED: usize = 4;

/// 内容仓库：站点所有文章和图片操作的唯一入口
///
/// 底层存储通过 [`DocumentStore`] 和 [`BlobStore`] 注入，
/// 本地运行和测试都用 [`crate::store::LocalStore`]。
#[derive(Clone)]
pub struct ContentRepository {
    docs: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

/// 将存储文档解码为文章记录
fn decode(doc: Document) -> StoreResult<PostRecord> {
    serde_json::from_value(doc.into_value())
        .map_err(|e| StoreError::Corrupt(format!("文章文档解析失败: {}", e)))
}

fn decode_all(docs: Vec<Document>) -> StoreResult<Vec<PostRecord>> {
    docs.into_iter().map(decode).collect()
}

impl ContentRepository {
    pub fn new(docs: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { docs, blobs }
    }

    /// 列出全部文章，按创建时间倒序
    ///
    /// `published_only` 为 true 时过滤掉草稿。
    pub async fn all_posts(&self, published_only: bool) -> StoreResult<Vec<PostRecord>> {
        let mut query = Query::new().order_by("createdAt", Direction::Desc);
        if published_only {
            query = query.filter(Filter::eq("published", true));
        }
        let docs = self
            .docs
            .query(POSTS_COLLECTION, &query)
            .await
            .map_err(|e| {
                error!("获取文章列表失败: {}", e);
                e
            })?;
        decode_all(docs)
    }

    /// 按浏览量倒序取已发布的精选文章，`limit` 为空时取 4 篇
    pub async fn featured_posts(&self, limit: Option<usize>) -> StoreResult<Vec<PostRecord>> {
        let query = Query::new()
            .filter(Filter::eq("published", true))
            .order_by("viewCount", Direction::Desc)
            .limit(limit.unwrap_or(DEFAULT_FEATURED));
        let docs = self
            .docs
            .query(POSTS_COLLECTION, &query)
            .await
            .map_err(|e| {
                error!("获取精选文章失败: {}", e);
                e
            })?;
        decode_all(docs)
    }

    /// 按别名查找文章，找不到时返回 None
    pub async fn post_by_slug(&self, slug: &str) -> StoreResult<Option<PostRecord>> {
        let query = Query::new().filter(Filter::eq("slug", slug)).limit(1);
        let docs = self
            .docs
            .query(POSTS_COLLECTION, &query)
            .await
            .map_err(|e| {
                error!("按别名查找文章失败 ({}): {}", slug, e);
                e
            })?;
        docs.into_iter().next().map(decode).transpose()
    }

    /// 按 id 查找文章，找不到时返回 None
    pub async fn post_by_id(&self, id: &str) -> StoreResult<Option<PostRecord>> {
        let doc = self.docs.get(POSTS_COLLECTION, id).await.map_err(|e| {
            error!("按 id 查找文章失败 ({}): {}", id, e);
            e
        })?;
        doc.map(decode).transpose()
    }

    /// 创建文章并返回存储分配的 id
    ///
    /// 浏览量从 0 开始，创建和更新时间由服务端统一写入，
    /// 别名缺省时从标题生成。
    pub async fn create_post(&self, draft: PostDraft) -> StoreResult<String> {
        let slug = draft.resolved_slug();
        let mut fields = match serde_json::to_value(&draft)? {
            Value::Object(map) => map,
            _ => return Err(StoreError::Corrupt("文章草稿序列化结果不是对象".to_string())),
        };

        let now = Utc::now();
        fields.insert("slug".to_string(), json!(slug));
        fields.insert("viewCount".to_string(), json!(0));
        fields.insert("createdAt".to_string(), json!(now));
        fields.insert("updatedAt".to_string(), json!(now));

        let id = self
            .docs
            .insert(POSTS_COLLECTION, fields)
            .await
            .map_err(|e| {
                error!("创建文章失败: {}", e);
                e
            })?;
        info!("创建文章: {} ({})", slug, id);
        Ok(id)
    }

    /// 部分更新文章
    ///
    /// 只合并调用者给出的字段，未提供的字段保持原值不变；
    /// 无论改了什么，更新时间都会刷新。
    pub async fn update_post(&self, id: &str, patch: PostPatch) -> StoreResult<()> {
        let mut fields = match serde_json::to_value(&patch)? {
            Value::Object(map) => map,
            _ => return Err(StoreError::Corrupt("更新内容序列化结果不是对象".to_string())),
        };
        fields.insert("updatedAt".to_string(), json!(Utc::now()));

        self.docs
            .update(POSTS_COLLECTION, id, fields)
            .await
            .map_err(|e| {
                error!("更新文章失败 ({}): {}", id, e);
                e
            })?;
        info!("更新文章: {}", id);
        Ok(())
    }

    /// 删除文章，封面图片保留在存储里
    pub async fn delete_post(&self, id: &str) -> StoreResult<()> {
        self.docs
            .delete(POSTS_COLLECTION, id)
            .await
            .map_err(|e| {
                error!("删除文章失败 ({}): {}", id, e);
                e
            })?;
        info!("删除文章: {}", id);
        Ok(())
    }

    /// 浏览量加一，字段缺失时按 0 处理
    ///
    /// 读取后写回，两个并发请求可能互相覆盖，浏览计数允许这种误差。
    pub async fn increment_view_count(&self, id: &str) -> StoreResult<()> {
        let doc = self
            .docs
            .get(POSTS_COLLECTION, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: POSTS_COLLECTION.to_string(),
                id: id.to_string(),
            })?;
        let current = doc.field("viewCount").and_then(Value::as_u64).unwrap_or(0);

        let mut fields = Map::new();
        fields.insert("viewCount".to_string(), json!(current + 1));
        self.docs
            .update(POSTS_COLLECTION, id, fields)
            .await
            .map_err(|e| {
                error!("更新浏览计数失败 ({}): {}", id, e);
                e
            })
    }

    /// 列出某分类下已发布的文章，按创建时间倒序
    pub async fn posts_by_category(&self, name: &str) -> StoreResult<Vec<PostRecord>> {
        let query = Query::new()
            .filter(Filter::eq("published", true))
            .filter(Filter::array_contains("categories", name))
            .order_by("createdAt", Direction::Desc);
        let docs = self
            .docs
            .query(POSTS_COLLECTION, &query)
            .await
            .map_err(|e| {
                error!("获取分类文章失败 ({}): {}", name, e);
                e
            })?;
        decode_all(docs)
    }

    /// 列出已发布文章用到的所有分类，按首次出现顺序去重
    pub async fn all_categories(&self) -> StoreResult<Vec<String>> {
        let posts = self.all_posts(true).await?;
        let mut seen = Vec::new();
        for post in posts {
            for category in post.categories {
                if !seen.contains(&category) {
                    seen.push(category);
                }
            }
        }
        Ok(seen)
    }

    /// 分类概览，带文章数量，按名称排序
    pub async fn categories_with_counts(&self) -> StoreResult<Vec<CategorySummary>> {
        let posts = self.all_posts(true).await?;
        let mut summaries: Vec<CategorySummary> = Vec::new();
        for post in &posts {
            for category in &post.categories {
                match summaries.iter_mut().find(|s| &s.name == category) {
                    Some(summary) => summary.post_count += 1,
                    None => summaries.push(CategorySummary {
                        name: category.clone(),
                        slug: utils::slugify(category),
                        post_count: 1,
                    }),
                }
            }
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(summaries)
    }

    /// 上传封面图片，返回公开访问地址
    pub async fn upload_image(&self, filename: &str, bytes: Vec<u8>) -> StoreResult<String> {
        let url = self
            .blobs
            .upload(COVERS_FOLDER, filename, bytes)
            .await
            .map_err(|e| {
                error!("上传图片失败 ({}): {}", filename, e);
                e
            })?;
        info!("上传图片: {}", url);
        Ok(url)
    }

    /// 按公开地址删除图片
    ///
    /// 地址不属于本站存储时直接返回，不触发任何存储调用。
    pub async fn delete_image(&self, url: &str) -> StoreResult<()> {
        let marker = format!("{}/", self.blobs.public_base().trim_end_matches('/'));
        let key = match url.find(&marker) {
            Some(pos) => &url[pos + marker.len()..],
            None => {
                debug!("忽略非本站图片地址: {}", url);
                return Ok(());
            }
        };
        let key = key.split('?').next().unwrap_or(key);
        if key.is_empty() {
            debug!("忽略非本站图片地址: {}", url);
            return Ok(());
        }

        self.blobs.delete(key).await.map_err(|e| {
            error!("删除图片失败 ({}): {}", key, e);
            e
        })?;
        info!("删除图片: {}", key);
        Ok(())
    }
}
