use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

// 编译进二进制的默认主题文件
pub const LAYOUT_HTML: &str = include_str!("../../embed/theme/default/layout.html");
pub const INDEX_HTML: &str = include_str!("../../embed/theme/default/index.html");
pub const POST_HTML: &str = include_str!("../../embed/theme/default/post.html");
pub const CATEGORY_HTML: &str = include_str!("../../embed/theme/default/category.html");
pub const CATEGORIES_HTML: &str = include_str!("../../embed/theme/default/categories.html");
pub const SEARCH_HTML: &str = include_str!("../../embed/theme/default/search.html");
pub const ERROR_HTML: &str = include_str!("../../embed/theme/default/error.html");
pub const NOT_FOUND_HTML: &str = include_str!("../../embed/theme/default/404.html");
pub const PARTIAL_POST_CARD: &str =
    include_str!("../../embed/theme/default/partials/post_card.html");
pub const PARTIAL_PAGINATION: &str =
    include_str!("../../embed/theme/default/partials/pagination.html");
pub const PARTIAL_SHARE: &str = include_str!("../../embed/theme/default/partials/share.html");
pub const PARTIAL_SEARCH_FORM: &str =
    include_str!("../../embed/theme/default/partials/search_form.html");
pub const STYLE_CSS: &str = include_str!("../../embed/theme/default/source/css/style.css");
pub const SITE_JS: &str = include_str!("../../embed/theme/default/source/js/site.js");

/// 默认主题的全部模板，名称与磁盘主题的 layout 目录保持一致
pub fn templates() -> Vec<(&'static str, &'static str)> {
    vec![
        ("layout.html", LAYOUT_HTML),
        ("index.html", INDEX_HTML),
        ("post.html", POST_HTML),
        ("category.html", CATEGORY_HTML),
        ("categories.html", CATEGORIES_HTML),
        ("search.html", SEARCH_HTML),
        ("error.html", ERROR_HTML),
        ("404.html", NOT_FOUND_HTML),
        ("partials/post_card.html", PARTIAL_POST_CARD),
        ("partials/pagination.html", PARTIAL_PAGINATION),
        ("partials/share.html", PARTIAL_SHARE),
        ("partials/search_form.html", PARTIAL_SEARCH_FORM),
    ]
}

/// 把默认主题落到主题目录，init 之后用户可以直接改
pub fn write_to(theme_dir: &Path) -> Result<()> {
    let layout_dir = theme_dir.join("layout");
    let partials_dir = layout_dir.join("partials");
    let css_dir = theme_dir.join("source").join("css");
    let js_dir = theme_dir.join("source").join("js");

    for dir in [&layout_dir, &partials_dir, &css_dir, &js_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("创建主题目录失败: {}", dir.display()))?;
    }

    for (name, content) in templates() {
        fs::write(layout_dir.join(name), content)
            .with_context(|| format!("写入主题模板失败: {}", name))?;
    }
    fs::write(css_dir.join("style.css"), STYLE_CSS).context("写入主题样式失败")?;
    fs::write(js_dir.join("site.js"), SITE_JS).context("写入主题脚本失败")?;

    info!("默认主题已写入: {}", theme_dir.display());
    Ok(())
}
