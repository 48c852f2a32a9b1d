use chrono::{DateTime, Utc};
use std::path::Path;

/// 从标题生成 URL 友好的别名
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// 检查文件是否为 Markdown 文件
pub fn is_markdown_file<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if let Some(ext) = path.extension() {
        ext == "md" || ext == "markdown"
    } else {
        false
    }
}

/// 从 Markdown 正文提取纯文本摘要
///
/// 跳过标题、图片和代码块行，超过 `limit` 个字符时截断并追加省略号。
pub fn excerpt(content: &str, limit: usize) -> String {
    let text = content
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && !line.starts_with('#')
                && !line.starts_with("![")
                && !line.starts_with("```")
        })
        .collect::<Vec<_>>()
        .join(" ");

    // 按字符边界截断，避免切断多字节字符
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text,
    }
}

/// 清理上传文件名，只保留 ASCII 字母数字和 `.-_`
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// 计算两个日期之间的相对时间描述
pub fn relative_time_from_now(date: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*date);

    if duration.num_minutes() < 1 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{} minutes ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{} hours ago", duration.num_hours())
    } else if duration.num_days() < 30 {
        format!("{} days ago", duration.num_days())
    } else if duration.num_days() < 365 {
        format!("{} months ago", duration.num_days() / 30)
    } else {
        format!("{} years ago", duration.num_days() / 365)
    }
}

pub mod markdown;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_skips_markup_lines() {
        let content = "# 标题\n\n![封面](/media/cover.png)\n\n第一段。\n\n第二段。";
        assert_eq!(excerpt(content, 200), "第一段。 第二段。");
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let content = "进击的巨人最终季完结纪念";
        let short = excerpt(content, 4);
        assert_eq!(short, "进击的巨...");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cover.png"), "cover.png");
        assert_eq!(sanitize_filename("海报 final.png"), "final.png");
        assert_eq!(sanitize_filename("a/b/evil name.jpg"), "evil-name.jpg");
        assert_eq!(sanitize_filename("???"), "file");
    }

    #[test]
    fn test_is_markdown_file() {
        assert!(is_markdown_file("post.md"));
        assert!(is_markdown_file("post.markdown"));
        assert!(!is_markdown_file("style.css"));
    }
}
