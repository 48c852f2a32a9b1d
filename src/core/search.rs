use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::models::{PostRecord, SearchQuery, SortMode};
use crate::utils;

/// 在文章列表上执行搜索和筛选
///
/// 关键词对标题、摘要和正文做不区分大小写的包含匹配，
/// 分类要求精确命中，最后按排序模式整理结果。
pub fn apply_query(posts: &[PostRecord], query: &SearchQuery) -> Vec<PostRecord> {
    let term = query.term.trim().to_lowercase();

    let mut results: Vec<PostRecord> = posts
        .iter()
        .filter(|post| {
            if !term.is_empty() {
                let hit = post.title.to_lowercase().contains(&term)
                    || post
                        .excerpt
                        .as_deref()
                        .map_or(false, |e| e.to_lowercase().contains(&term))
                    || post.content.to_lowercase().contains(&term);
                if !hit {
                    return false;
                }
            }
            if let Some(category) = &query.category {
                if !post.categories.iter().any(|c| c == category) {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect();

    match query.sort {
        SortMode::Recent => results.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Popular => results.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then(b.created_at.cmp(&a.created_at))
        }),
        SortMode::Oldest => results.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }

    results
}

/// 搜索索引项，提供给前端的快速搜索框
#[derive(Debug, Serialize)]
pub struct SearchIndexItem {
    /// 文章标题
    pub title: String,
    /// 文章别名
    pub slug: String,
    /// 摘要或全文
    pub excerpt: String,
    /// 分类
    pub categories: Vec<String>,
    /// 发布日期
    pub date: String,
}

/// 搜索索引生成器
pub struct SearchIndexBuilder {
    /// 是否把全文写进索引
    use_full_content: bool,
}

impl SearchIndexBuilder {
    pub fn new(use_full_content: bool) -> Self {
        Self { use_full_content }
    }

    /// 把文章列表编成 JSON 索引
    pub fn build(&self, posts: &[PostRecord]) -> Result<String> {
        let index: Vec<SearchIndexItem> = posts
            .iter()
            .map(|post| {
                let excerpt = if self.use_full_content {
                    post.content.clone()
                } else {
                    post.excerpt
                        .clone()
                        .unwrap_or_else(|| utils::excerpt(&post.content, 150))
                };
                SearchIndexItem {
                    title: post.title.clone(),
                    slug: post.slug.clone(),
                    excerpt,
                    categories: post.categories.clone(),
                    date: post.created_at.format("%Y-%m-%d").to_string(),
                }
            })
            .collect();

        debug!("搜索索引包含 {} 篇文章", index.len());
        Ok(serde_json::to_string(&index)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;
    use chrono::{Duration, Utc};

    fn post(title: &str, categories: &[&str], views: u64, days_ago: i64) -> PostRecord {
        let created = Utc::now() - Duration::days(days_ago);
        PostRecord {
            id: format!("id-{}", title),
            title: title.to_string(),
            slug: utils::slugify(title),
            content: format!("{} 的正文内容", title),
            excerpt: None,
            cover_image: None,
            categories: categories.iter().map(|s| s.to_string()).collect(),
            author: Author {
                name: "小编".to_string(),
                image: None,
            },
            published: true,
            view_count: views,
            created_at: created,
            updated_at: created,
        }
    }

    fn titles(posts: &[PostRecord]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_term_matches_title_case_insensitive() {
        let posts = vec![
            post("Attack on Titan", &["热血"], 10, 3),
            post("夏日重现", &["悬疑"], 5, 1),
        ];
        let query = SearchQuery {
            term: "titan".to_string(),
            ..Default::default()
        };
        assert_eq!(titles(&apply_query(&posts, &query)), vec!["Attack on Titan"]);
    }

    #[test]
    fn test_category_must_match_exactly() {
        let posts = vec![
            post("甲", &["热血", "奇幻"], 0, 2),
            post("乙", &["治愈"], 0, 1),
        ];
        let query = SearchQuery {
            category: Some("奇幻".to_string()),
            ..Default::default()
        };
        assert_eq!(titles(&apply_query(&posts, &query)), vec!["甲"]);

        let query = SearchQuery {
            category: Some("奇".to_string()),
            ..Default::default()
        };
        assert!(apply_query(&posts, &query).is_empty());
    }

    #[test]
    fn test_sort_modes() {
        let posts = vec![
            post("旧文", &[], 100, 30),
            post("新文", &[], 1, 1),
            post("爆款", &[], 999, 10),
        ];

        let recent = apply_query(&posts, &SearchQuery::default());
        assert_eq!(titles(&recent), vec!["新文", "爆款", "旧文"]);

        let query = SearchQuery {
            sort: SortMode::Popular,
            ..Default::default()
        };
        assert_eq!(titles(&apply_query(&posts, &query)), vec!["爆款", "旧文", "新文"]);

        let query = SearchQuery {
            sort: SortMode::Oldest,
            ..Default::default()
        };
        assert_eq!(titles(&apply_query(&posts, &query)), vec!["旧文", "爆款", "新文"]);
    }

    #[test]
    fn test_index_builder_outputs_slug_and_excerpt() {
        let builder = SearchIndexBuilder::new(false);
        let json = builder.build(&[post("进击的巨人", &["热血"], 0, 1)]).unwrap();
        assert!(json.contains("\"slug\":\"jin-ji-de-ju-ren\""));
        assert!(json.contains("正文内容"));
    }
}
