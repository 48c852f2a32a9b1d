use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 文章作者信息（内嵌在文章文档中，不是独立引用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// 作者名称
    pub name: String,
    /// 作者头像 URL
    #[serde(default)]
    pub image: Option<String>,
}

/// 博客文章的完整记录
///
/// 字段序列化为 camelCase，与存储中的文档字段名保持一致
/// （`viewCount`、`coverImage`、`createdAt`、`updatedAt`）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// 文档标识，由存储在创建时分配
    pub id: String,
    /// 文章标题
    pub title: String,
    /// URL 别名，视为唯一
    pub slug: String,
    /// 文章内容（原始 Markdown，展示时渲染）
    pub content: String,
    /// 文章摘要
    #[serde(default)]
    pub excerpt: Option<String>,
    /// 封面图片 URL
    #[serde(default)]
    pub cover_image: Option<String>,
    /// 文章分类标签
    #[serde(default)]
    pub categories: Vec<String>,
    /// 作者信息
    pub author: Author,
    /// 是否已发布，未发布的文章不出现在公共列表中
    #[serde(default)]
    pub published: bool,
    /// 浏览次数，正常情况下单调不减
    #[serde(default)]
    pub view_count: u64,
    /// 创建时间（服务端分配）
    pub created_at: DateTime<Utc>,
    /// 更新时间（每次修改时刷新）
    pub updated_at: DateTime<Utc>,
}

/// 创建文章时的输入
///
/// 不包含 id、时间戳和浏览计数，这些由仓库在创建时注入。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    /// 文章标题
    pub title: String,
    /// URL 别名，为空时根据标题生成
    #[serde(default)]
    pub slug: Option<String>,
    /// 文章内容（Markdown）
    pub content: String,
    /// 文章摘要
    #[serde(default)]
    pub excerpt: Option<String>,
    /// 封面图片 URL
    #[serde(default)]
    pub cover_image: Option<String>,
    /// 文章分类标签
    #[serde(default)]
    pub categories: Vec<String>,
    /// 作者信息
    pub author: Author,
    /// 是否直接发布
    #[serde(default)]
    pub published: bool,
}

impl PostDraft {
    /// 计算最终的 URL 别名，未提供时根据标题生成
    pub fn resolved_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slug::slugify(&self.title),
        }
    }
}

/// 部分更新文章时的补丁
///
/// 每个字段的存在与否都有意义：为 `None` 的字段不会写入存储。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
}

impl PostPatch {
    /// 是否没有携带任何字段
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && self.cover_image.is_none()
            && self.categories.is_none()
            && self.author.is_none()
            && self.published.is_none()
            && self.view_count.is_none()
    }
}

/// 搜索结果排序方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// 最新发布在前
    #[default]
    Recent,
    /// 浏览量最高在前
    Popular,
    /// 最早发布在前
    Oldest,
}

impl SortMode {
    /// 查询参数中使用的键名
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Recent => "recent",
            SortMode::Popular => "popular",
            SortMode::Oldest => "oldest",
        }
    }
}

/// 搜索栏提交的查询条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// 搜索关键词
    #[serde(default)]
    pub term: String,
    /// 分类筛选，`None` 表示全部分类
    #[serde(default)]
    pub category: Option<String>,
    /// 排序方式
    #[serde(default)]
    pub sort: SortMode,
}

impl SearchQuery {
    /// 规整查询条件：去除关键词两端空白，空分类视为未筛选
    pub fn normalized(mut self) -> Self {
        self.term = self.term.trim().to_string();
        if self.category.as_deref().map_or(false, |c| c.trim().is_empty()) {
            self.category = None;
        }
        self
    }

    /// 是否为默认查询（无关键词、无分类、默认排序）
    pub fn is_default(&self) -> bool {
        self.term.is_empty() && self.category.is_none() && self.sort == SortMode::default()
    }
}

/// 分类概要，用于分类卡片展示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    /// 分类名称
    pub name: String,
    /// 分类别名（用于URL）
    pub slug: String,
    /// 该分类下的文章数量
    pub post_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_slug_falls_back_to_title() {
        let mut draft = PostDraft {
            title: "进击的巨人 最终季".to_string(),
            slug: None,
            content: String::new(),
            excerpt: None,
            cover_image: None,
            categories: Vec::new(),
            author: Author {
                name: "编辑部".to_string(),
                image: None,
            },
            published: false,
        };
        assert!(!draft.resolved_slug().is_empty());

        draft.slug = Some("  ".to_string());
        assert_eq!(draft.resolved_slug(), slug::slugify(&draft.title));

        draft.slug = Some("attack-on-titan-final".to_string());
        assert_eq!(draft.resolved_slug(), "attack-on-titan-final");
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = PostPatch {
            title: Some("新标题".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        let map = value.as_object().unwrap();
        // 只有携带的字段会被序列化
        assert_eq!(map.len(), 1);
        assert_eq!(map["title"], "新标题");
        assert!(PostPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_record_uses_document_field_names() {
        let record = PostRecord {
            id: "1".to_string(),
            title: "t".to_string(),
            slug: "t".to_string(),
            content: String::new(),
            excerpt: None,
            cover_image: Some("http://example.com/c.png".to_string()),
            categories: vec!["热血".to_string()],
            author: Author {
                name: "a".to_string(),
                image: None,
            },
            published: true,
            view_count: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("viewCount").is_some());
        assert!(value.get("coverImage").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
    }

    #[test]
    fn test_search_query_normalized() {
        let query = SearchQuery {
            term: "  鬼灭之刃 ".to_string(),
            category: Some("".to_string()),
            sort: SortMode::Popular,
        }
        .normalized();
        assert_eq!(query.term, "鬼灭之刃");
        assert_eq!(query.category, None);
        assert!(!query.is_default());
        assert!(SearchQuery::default().is_default());
    }
}
