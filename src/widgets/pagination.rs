use serde::Serialize;

/// 当前页两侧各显示的页码数量
pub const DEFAULT_WINDOW: usize = 2;

/// 页码条上的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageItem {
    /// 具体页码
    Page { number: usize, current: bool },
    /// 被折叠的页码区间
    Ellipsis,
}

/// 分页控件数据，直接序列化进模板上下文
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub total: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub items: Vec<PageItem>,
}

impl Pagination {
    /// 用默认窗口构建分页条
    pub fn build(current: usize, total: usize) -> Option<Self> {
        Self::with_window(current, total, DEFAULT_WINDOW)
    }

    /// 构建以当前页为中心的页码窗口
    ///
    /// 总页数不超过一页时返回 None，模板里就什么都不渲染。
    /// 越界的当前页会被收拢到合法范围内。
    pub fn with_window(current: usize, total: usize, window: usize) -> Option<Self> {
        if total <= 1 {
            return None;
        }
        let current = current.clamp(1, total);

        let start = current.saturating_sub(window).max(1);
        let end = (current + window).min(total);

        let mut items = Vec::new();
        if start > 1 {
            items.push(PageItem::Page {
                number: 1,
                current: false,
            });
            if start > 2 {
                items.push(PageItem::Ellipsis);
            }
        }
        for number in start..=end {
            items.push(PageItem::Page {
                number,
                current: number == current,
            });
        }
        if end < total {
            if end < total - 1 {
                items.push(PageItem::Ellipsis);
            }
            items.push(PageItem::Page {
                number: total,
                current: false,
            });
        }

        Some(Self {
            current,
            total,
            prev: (current > 1).then(|| current - 1),
            next: (current < total).then(|| current + 1),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 把页码条拍平成数字序列，None 代表省略号
    fn numbers(pagination: &Pagination) -> Vec<Option<usize>> {
        pagination
            .items
            .iter()
            .map(|item| match item {
                PageItem::Page { number, .. } => Some(*number),
                PageItem::Ellipsis => None,
            })
            .collect()
    }

    #[test]
    fn test_middle_page_shows_both_ellipses() {
        let p = Pagination::build(5, 10).unwrap();
        assert_eq!(
            numbers(&p),
            vec![
                Some(1),
                None,
                Some(3),
                Some(4),
                Some(5),
                Some(6),
                Some(7),
                None,
                Some(10)
            ]
        );
        assert_eq!(p.prev, Some(4));
        assert_eq!(p.next, Some(6));
    }

    #[test]
    fn test_first_page_has_no_prev() {
        let p = Pagination::build(1, 10).unwrap();
        assert_eq!(
            numbers(&p),
            vec![Some(1), Some(2), Some(3), None, Some(10)]
        );
        assert_eq!(p.prev, None);
        assert_eq!(p.next, Some(2));
        assert!(matches!(
            p.items[0],
            PageItem::Page { number: 1, current: true }
        ));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let p = Pagination::build(10, 10).unwrap();
        assert_eq!(
            numbers(&p),
            vec![Some(1), None, Some(8), Some(9), Some(10)]
        );
        assert_eq!(p.prev, Some(9));
        assert_eq!(p.next, None);
    }

    #[test]
    fn test_adjacent_boundary_skips_ellipsis() {
        // 窗口边缘紧挨着首尾页时不插省略号
        let p = Pagination::build(2, 3).unwrap();
        assert_eq!(numbers(&p), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_single_page_renders_nothing() {
        assert!(Pagination::build(1, 1).is_none());
        assert!(Pagination::build(1, 0).is_none());
    }

    #[test]
    fn test_out_of_range_current_is_clamped() {
        let p = Pagination::build(99, 5).unwrap();
        assert_eq!(p.current, 5);
        let p = Pagination::build(0, 5).unwrap();
        assert_eq!(p.current, 1);
    }

    #[test]
    fn test_serializes_kind_tags_for_templates() {
        let value = serde_json::to_value(PageItem::Ellipsis).unwrap();
        assert_eq!(value["kind"], "ellipsis");
        let value = serde_json::to_value(PageItem::Page {
            number: 3,
            current: false,
        })
        .unwrap();
        assert_eq!(value["kind"], "page");
        assert_eq!(value["number"], 3);
    }
}
