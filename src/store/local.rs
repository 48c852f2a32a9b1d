use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::store::document::{
    BlobStore, Direction, Document, DocumentStore, Filter, Query, StoreError, StoreResult,
};
use crate::utils;

/// 本地存储：文档保存在内存中并可快照到 JSON 文件，图片落到本地目录
///
/// 同时实现 [`DocumentStore`] 和 [`BlobStore`]。内存模式用于测试和临时预览，
/// 持久模式在每次写入后把数据快照到 `store.json`。
pub struct LocalStore {
    data: RwLock<StoreData>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    data_file: Option<PathBuf>,
    media_dir: Option<PathBuf>,
    public_base: String,
    counter: AtomicU64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    collections: BTreeMap<String, BTreeMap<String, Map<String, Value>>>,
}

impl LocalStore {
    /// 创建纯内存存储
    pub fn in_memory() -> Self {
        Self {
            data: RwLock::new(StoreData::default()),
            blobs: RwLock::new(HashMap::new()),
            data_file: None,
            media_dir: None,
            public_base: "/media".to_string(),
            counter: AtomicU64::new(0),
        }
    }

    /// 打开持久化存储
    ///
    /// `data_dir` 下的 `store.json` 保存文档快照，`media_dir` 存放上传的图片，
    /// `public_base` 是图片对外暴露的 URL 前缀。
    pub fn open(
        data_dir: impl AsRef<Path>,
        media_dir: impl AsRef<Path>,
        public_base: &str,
    ) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref();
        let media_dir = media_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        fs::create_dir_all(media_dir)?;

        let data_file = data_dir.join("store.json");
        let data = if data_file.exists() {
            let content = fs::read_to_string(&data_file)?;
            serde_json::from_str(&content)
                .map_err(|e| StoreError::Corrupt(format!("解析 store.json 失败: {}", e)))?
        } else {
            StoreData::default()
        };

        let doc_count: usize = data.collections.values().map(|c| c.len()).sum();
        info!("本地存储已打开: {} ({} 个文档)", data_file.display(), doc_count);

        Ok(Self {
            data: RwLock::new(data),
            blobs: RwLock::new(HashMap::new()),
            data_file: Some(data_file),
            media_dir: Some(media_dir.to_path_buf()),
            public_base: public_base.trim_end_matches('/').to_string(),
            counter: AtomicU64::new(0),
        })
    }

    /// 将当前数据快照写回磁盘，内存模式下不做任何事
    fn persist(&self, data: &StoreData) -> StoreResult<()> {
        if let Some(path) = &self.data_file {
            let json = serde_json::to_string_pretty(data)?;
            fs::write(path, json)?;
        }
        Ok(())
    }

    /// 生成时间有序的唯一 id
    fn next_id(&self, existing: &BTreeMap<String, Map<String, Value>>) -> String {
        loop {
            let seq = self.counter.fetch_add(1, AtomicOrdering::Relaxed);
            let id = format!("{}-{:04}", Utc::now().timestamp_millis(), seq);
            if !existing.contains_key(&id) {
                return id;
            }
        }
    }

    fn not_found(collection: &str, id: &str) -> StoreError {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// 判断文档是否满足过滤条件
fn matches(fields: &Map<String, Value>, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(field, expected) => fields.get(field) == Some(expected),
        Filter::ArrayContains(field, expected) => fields
            .get(field)
            .and_then(Value::as_array)
            .map_or(false, |items| items.contains(expected)),
    }
}

/// 比较两个字段值：数字按数值比较，RFC 3339 字符串按时间比较，其余按字典序
fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        if let (Ok(dx), Ok(dy)) = (
            DateTime::parse_from_rfc3339(x),
            DateTime::parse_from_rfc3339(y),
        ) {
            return dx.cmp(&dy);
        }
        return x.cmp(y);
    }
    a.to_string().cmp(&b.to_string())
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>> {
        let data = self.data.read().unwrap();
        let mut docs: Vec<Document> = data
            .collections
            .get(collection)
            .map(|coll| {
                coll.iter()
                    .filter(|(_, fields)| query.filters.iter().all(|f| matches(fields, f)))
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        drop(data);

        if let Some((field, direction)) = &query.order_by {
            let desc = *direction == Direction::Desc;
            docs.sort_by(|a, b| {
                use std::cmp::Ordering;
                // 缺少排序字段的文档始终排在最后
                match (a.fields.get(field), b.fields.get(field)) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(x), Some(y)) => {
                        let ord = compare_values(x, y);
                        if desc {
                            ord.reverse()
                        } else {
                            ord
                        }
                    }
                }
            });
        }

        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }

        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let data = self.data.read().unwrap();
        Ok(data
            .collections
            .get(collection)
            .and_then(|coll| coll.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> StoreResult<String> {
        let mut data = self.data.write().unwrap();
        let coll = data.collections.entry(collection.to_string()).or_default();
        let id = self.next_id(coll);
        coll.insert(id.clone(), fields);
        self.persist(&data)?;
        debug!("插入文档: {}/{}", collection, id);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        let mut data = self.data.write().unwrap();
        let existing = data
            .collections
            .get_mut(collection)
            .and_then(|coll| coll.get_mut(id))
            .ok_or_else(|| Self::not_found(collection, id))?;
        for (key, value) in fields {
            existing.insert(key, value);
        }
        self.persist(&data)?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut data = self.data.write().unwrap();
        let removed = data
            .collections
            .get_mut(collection)
            .and_then(|coll| coll.remove(id));
        if removed.is_none() {
            return Err(Self::not_found(collection, id));
        }
        self.persist(&data)?;
        debug!("删除文档: {}/{}", collection, id);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn upload(&self, folder: &str, filename: &str, bytes: Vec<u8>) -> StoreResult<String> {
        let key = format!(
            "{}/{}_{}",
            folder,
            Utc::now().timestamp_millis(),
            utils::sanitize_filename(filename)
        );

        if let Some(media_dir) = &self.media_dir {
            let path = media_dir.join(&key);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &bytes)?;
        } else {
            self.blobs.write().unwrap().insert(key.clone(), bytes);
        }

        debug!("上传对象: {}", key);
        Ok(format!("{}/{}", self.public_base, key))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        // 禁止路径穿越
        if key.split('/').any(|part| part == "..") {
            return Err(StoreError::Corrupt(format!("非法的对象路径: {}", key)));
        }

        if let Some(media_dir) = &self.media_dir {
            let path = media_dir.join(key);
            if !path.exists() {
                return Err(Self::not_found("blobs", key));
            }
            fs::remove_file(path)?;
        } else {
            let removed = self.blobs.write().unwrap().remove(key);
            if removed.is_none() {
                return Err(Self::not_found("blobs", key));
            }
        }

        debug!("删除对象: {}", key);
        Ok(())
    }

    fn public_base(&self) -> &str {
        &self.public_base
    }
}
