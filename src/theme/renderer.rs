use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tera::Tera;
use tracing::{debug, error, info};

use crate::models::Config;
use crate::theme::default as default_theme;
use crate::utils;

#[derive(Clone)]
pub struct ThemeRenderer {
    /// 主题目录
    pub theme_dir: PathBuf,
    /// 模板引擎
    pub tera: Tera,
    /// 是否在用内置默认主题
    pub embedded: bool,
}

impl ThemeRenderer {
    /// 创建主题渲染器
    ///
    /// 主题目录缺失时退回到编译进二进制的默认主题，
    /// 站点不经过 init 也能直接预览。
    pub fn new(base_dir: &Path, config: &Config) -> Result<Self> {
        let theme_dir = base_dir.join("themes").join(config.theme_name());
        let layout_dir = theme_dir.join("layout");

        let mut tera;
        let embedded;
        if layout_dir.exists() {
            let glob = format!("{}/**/*.html", layout_dir.display());
            tera = Tera::new(&glob)
                .with_context(|| format!("加载主题模板失败: {}", layout_dir.display()))?;
            embedded = false;
        } else {
            info!("主题目录不存在，使用内置默认主题: {}", theme_dir.display());
            tera = Tera::default();
            tera.add_raw_templates(default_theme::templates())
                .context("加载内置主题模板失败")?;
            embedded = true;
        }

        Self::register_filters(&mut tera);
        Self::register_functions(&mut tera);

        Ok(ThemeRenderer {
            theme_dir,
            tera,
            embedded,
        })
    }

    /// 注册模板过滤器
    fn register_filters(tera: &mut Tera) {
        tera.register_filter("date_format", Self::date_format_filter);
        tera.register_filter("markdown", Self::markdown_filter);
        tera.register_filter("excerpt", Self::excerpt_filter);
    }

    /// 注册模板函数
    fn register_functions(tera: &mut Tera) {
        tera.register_function("relative_time", Self::relative_time_function);
    }

    /// 主题静态资源目录
    pub fn source_dir(&self) -> PathBuf {
        self.theme_dir.join("source")
    }

    /// 重新加载磁盘上的模板，内置主题无需处理
    pub fn reload_templates(&mut self) -> Result<()> {
        if self.embedded {
            return Ok(());
        }
        debug!("Reloading theme templates...");
        self.tera.full_reload()?;
        Ok(())
    }

    pub fn render_template(&self, template_name: &str, context: &tera::Context) -> Result<String> {
        match self.tera.render(template_name, context) {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("模板渲染失败 ({}): {}", template_name, e);
                Err(e.into())
            }
        }
    }

    fn date_format_filter(
        value: &tera::Value,
        args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        if let Some(date) = value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()) {
            let format = args
                .get("format")
                .and_then(|f| f.as_str())
                .unwrap_or("%Y-%m-%d");
            Ok(tera::Value::String(date.format(format).to_string()))
        } else {
            Ok(value.clone())
        }
    }

    fn markdown_filter(
        value: &tera::Value,
        _args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        if let Some(text) = value.as_str() {
            let html_output = utils::markdown::render(text);

            // 给代码块补上高亮类名
            let html_output = if html_output.contains("<pre><code") {
                html_output.replace("<pre><code", "<pre><code class=\"hljs\"")
            } else {
                html_output
            };

            Ok(tera::Value::String(html_output))
        } else {
            Ok(value.clone())
        }
    }

    fn excerpt_filter(
        value: &tera::Value,
        args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        if let Some(text) = value.as_str() {
            let limit = args
                .get("limit")
                .and_then(|v| v.as_u64())
                .unwrap_or(160) as usize;
            Ok(tera::Value::String(utils::excerpt(text, limit)))
        } else {
            Ok(value.clone())
        }
    }

    /// 把 RFC 3339 时间串变成相对时间描述，解析失败时原样返回
    fn relative_time_function(args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let raw = match args.get("date").and_then(|v| v.as_str()) {
            Some(s) => s,
            None => return Err(tera::Error::msg("缺少必要的参数: date")),
        };

        match DateTime::parse_from_rfc3339(raw) {
            Ok(date) => Ok(tera::Value::String(utils::relative_time_from_now(
                &date.with_timezone(&Utc),
            ))),
            Err(_) => Ok(tera::Value::String(raw.to_string())),
        }
    }
}
