use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub author_avatar: Option<String>,
    pub language: Option<String>,
    pub url: Option<String>,
    pub root: Option<String>,
    pub theme: Option<String>,
    pub per_page: Option<usize>,
    pub featured: Option<usize>,
    pub pagination_window: Option<usize>,
    pub data_dir: Option<String>,
    pub media_dir: Option<String>,
    pub content_dir: Option<String>,
    pub admin_token: Option<String>,
    pub feed: Option<FeedConfig>,
    pub search: Option<SearchConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub enable: bool,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub enable: bool,
    pub content: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Aniverse".to_string(),
            subtitle: None,
            description: None,
            author: None,
            author_avatar: None,
            language: Some("zh-CN".to_string()),
            url: None,
            root: Some("/".to_string()),
            theme: Some("default".to_string()),
            per_page: None,
            featured: None,
            pagination_window: None,
            data_dir: None,
            media_dir: None,
            content_dir: None,
            admin_token: None,
            feed: None,
            search: None,
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config)
    }

    /// 加载配置的别名
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_file(path)
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;
        Ok(())
    }

    /// 主题名称，默认 default
    pub fn theme_name(&self) -> String {
        self.theme.clone().unwrap_or_else(|| "default".to_string())
    }

    /// 站点完整 URL，默认指向本地预览地址
    pub fn site_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| "http://localhost:4000".to_string())
    }

    /// 站点语言
    pub fn language(&self) -> String {
        self.language
            .clone()
            .unwrap_or_else(|| "zh-CN".to_string())
    }

    /// 每页文章数
    pub fn per_page(&self) -> usize {
        self.per_page.unwrap_or(6).max(1)
    }

    /// 文档数据目录（相对站点目录）
    pub fn data_dir(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "data".to_string())
    }

    /// 上传图片目录（相对站点目录）
    pub fn media_dir(&self) -> String {
        self.media_dir.clone().unwrap_or_else(|| "media".to_string())
    }

    /// Markdown 内容目录（相对站点目录）
    pub fn content_dir(&self) -> String {
        self.content_dir
            .clone()
            .unwrap_or_else(|| "content".to_string())
    }
}
