use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// 存储层错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("文档不存在: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("存储数据损坏: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 无模式的 JSON 文档
///
/// 读取时的规整形式即 `{ id, ...fields }`：标识与字段在同一层级。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// 文档标识，由存储在插入时分配
    pub id: String,
    /// 文档字段
    pub fields: Map<String, Value>,
}

impl Document {
    /// 读取单个字段
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// 合并 id 与字段，得到 `{ id, ...fields }` 形式的 JSON 值
    pub fn into_value(self) -> Value {
        let mut map = self.fields;
        map.insert("id".to_string(), Value::String(self.id));
        Value::Object(map)
    }
}

/// 查询过滤条件
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// 字段等于给定值
    Eq(String, Value),
    /// 数组字段包含给定值
    ArrayContains(String, Value),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn array_contains(field: &str, value: impl Into<Value>) -> Self {
        Filter::ArrayContains(field.to_string(), value.into())
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// 文档查询：过滤、单字段排序、数量上限
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// 文档存储接口
///
/// 托管文档库的抽象：上层通过构造参数注入实现，测试时可替换为内存实现。
/// `get` 对不存在的文档返回 `None`，`update` 和 `delete` 返回 `NotFound` 错误。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 按条件查询集合中的文档
    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>>;

    /// 按 id 读取单个文档
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// 插入新文档，返回分配的 id
    async fn insert(&self, collection: &str, fields: Map<String, Value>) -> StoreResult<String>;

    /// 合并写入给定字段，未给出的字段保持不变
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()>;

    /// 删除文档
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;
}

/// 二进制对象存储接口（图片等上传内容）
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 上传对象，返回可公开访问的 URL
    async fn upload(&self, folder: &str, filename: &str, bytes: Vec<u8>) -> StoreResult<String>;

    /// 按存储内路径删除对象
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// 公开访问地址的前缀，用于识别本存储生成的 URL
    fn public_base(&self) -> &str;
}
