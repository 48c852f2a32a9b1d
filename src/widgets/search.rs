use serde::Serialize;

use crate::models::{SearchQuery, SortMode};

/// 搜索和筛选表单的界面状态
///
/// 表单本身不执行搜索，`submit` 和 `clear` 产出查询参数，
/// 由页面层交给 [`crate::core::search::apply_query`]。
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchForm {
    pub term: String,
    pub category: Option<String>,
    pub sort: SortMode,
    pub panel_open: bool,
}

impl SearchForm {
    /// 用本次请求的查询参数回填表单
    ///
    /// 带了分类或非默认排序时筛选面板保持展开。
    pub fn from_query(query: &SearchQuery) -> Self {
        Self {
            term: query.term.clone(),
            category: query.category.clone(),
            sort: query.sort,
            panel_open: query.category.is_some() || query.sort != SortMode::Recent,
        }
    }

    pub fn set_term(&mut self, term: &str) {
        self.term = term.to_string();
    }

    /// 空字符串视为不筛选分类
    pub fn set_category(&mut self, category: &str) {
        let category = category.trim();
        self.category = if category.is_empty() {
            None
        } else {
            Some(category.to_string())
        };
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.sort = sort;
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    /// 是否有任何筛选条件生效
    pub fn has_filters(&self) -> bool {
        !self.term.trim().is_empty()
            || self.category.is_some()
            || self.sort != SortMode::Recent
    }

    /// 提交表单，得到规范化后的查询参数
    pub fn submit(&self) -> SearchQuery {
        SearchQuery {
            term: self.term.clone(),
            category: self.category.clone(),
            sort: self.sort,
        }
        .normalized()
    }

    /// 清空全部筛选并立刻返回默认查询
    ///
    /// 调用方拿到返回值后直接重新执行搜索，界面马上回到未筛选的结果。
    /// 面板的展开状态不受影响。
    pub fn clear(&mut self) -> SearchQuery {
        self.term.clear();
        self.category = None;
        self.sort = SortMode::default();
        SearchQuery::default()
    }
}
