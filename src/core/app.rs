use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::{Author, Config, PostDraft};
use crate::repo::ContentRepository;
use crate::store::{BlobStore, DocumentStore, LocalStore};
use crate::theme::ThemeRenderer;
use crate::utils;

/// 站点应用：配置、内容仓库和模板渲染器的汇合点
///
/// 页面和接口处理器共享同一个 `Arc<App>`。
pub struct App {
    /// 站点根目录
    pub base_dir: PathBuf,
    /// 站点配置
    pub config: Config,
    /// 内容仓库
    pub repo: ContentRepository,
    /// 主题渲染器，监听主题变更时会整体重载
    pub renderer: RwLock<ThemeRenderer>,
}

impl App {
    /// 从站点目录打开应用，文档和图片都落在本地存储
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("config.yml");
        let config = if config_path.exists() {
            Config::load(&config_path)?
        } else {
            warn!("找不到 config.yml，使用默认配置");
            Config::default()
        };

        let store = Arc::new(
            LocalStore::open(
                base_dir.join(config.data_dir()),
                base_dir.join(config.media_dir()),
                "/media",
            )
            .context("打开本地存储失败")?,
        );
        Self::with_stores(base_dir, config, store.clone(), store)
    }

    /// 注入任意存储实现
    ///
    /// 测试用内存存储，将来接托管后端也从这里进来。
    pub fn with_stores(
        base_dir: PathBuf,
        config: Config,
        docs: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Result<Self> {
        let renderer = ThemeRenderer::new(&base_dir, &config)?;
        Ok(Self {
            base_dir,
            config,
            repo: ContentRepository::new(docs, blobs),
            renderer: RwLock::new(renderer),
        })
    }

    /// 主题静态资源目录
    pub fn theme_assets_dir(&self) -> PathBuf {
        self.renderer.read().unwrap().source_dir()
    }

    /// 上传图片的本地目录
    pub fn media_dir(&self) -> PathBuf {
        self.base_dir.join(self.config.media_dir())
    }

    /// 重新加载主题模板
    pub fn reload_templates(&self) -> Result<()> {
        self.renderer.write().unwrap().reload_templates()
    }

    /// 导入站点 content 目录下的 Markdown 文章
    pub async fn import_content(&self) -> Result<usize> {
        let dir = self.base_dir.join(self.config.content_dir());
        self.import_content_from(&dir).await
    }

    /// 从目录导入 Markdown 文章，front matter 提供元数据
    ///
    /// 别名已存在的文章会被跳过，反复导入不会产生重复。
    pub async fn import_content_from(&self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            warn!("内容目录不存在: {}", dir.display());
            return Ok(0);
        }

        info!("导入文章: {}", dir.display());
        let matter = Matter::<YAML>::new();
        let mut imported = 0;

        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || !utils::is_markdown_file(path) {
                continue;
            }

            let raw = fs::read_to_string(path)
                .with_context(|| format!("读取文章失败: {}", path.display()))?;
            let parsed = matter.parse(&raw);

            let file_stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("untitled")
                .to_string();

            let mut title = file_stem;
            let mut slug = None;
            let mut excerpt = None;
            let mut cover_image = None;
            let mut categories = Vec::new();
            let mut published = true;
            let mut author_name = None;

            if let Some(data) = &parsed.data {
                if let Ok(value) = data["title"].as_string() {
                    title = value;
                }
                if let Ok(value) = data["slug"].as_string() {
                    slug = Some(value);
                }
                if let Ok(value) = data["excerpt"].as_string() {
                    excerpt = Some(value);
                }
                if let Ok(value) = data["coverImage"].as_string() {
                    cover_image = Some(value);
                }
                if let Ok(items) = data["categories"].as_vec() {
                    categories = items
                        .iter()
                        .filter_map(|item| item.as_string().ok())
                        .collect();
                } else if let Ok(single) = data["categories"].as_string() {
                    categories = vec![single];
                }
                if let Ok(value) = data["published"].as_bool() {
                    published = value;
                }
                if let Ok(value) = data["author"].as_string() {
                    author_name = Some(value);
                }
            }

            let draft = PostDraft {
                title,
                slug,
                content: parsed.content.trim().to_string(),
                excerpt,
                cover_image,
                categories,
                author: Author {
                    name: author_name
                        .or_else(|| self.config.author.clone())
                        .unwrap_or_else(|| "Anonymous".to_string()),
                    image: self.config.author_avatar.clone(),
                },
                published,
            };

            let slug = draft.resolved_slug();
            if self.repo.post_by_slug(&slug).await?.is_some() {
                debug!("跳过已存在的文章: {}", slug);
                continue;
            }

            self.repo.create_post(draft).await?;
            imported += 1;
        }

        info!("导入完成，共 {} 篇", imported);
        Ok(imported)
    }
}
