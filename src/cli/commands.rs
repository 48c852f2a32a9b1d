use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info, warn};

use crate::core::{App, Server};
use crate::models::{Author, PostDraft};
use crate::theme;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 指定站点目录
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 初始化新的站点
    Init(InitArgs),

    /// 创建新的文章
    New(NewArgs),

    /// 导入 content 目录下的 Markdown 文章
    Import(ImportArgs),

    /// 启动本地服务器
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// 站点目录名称
    #[arg(value_name = "NAME")]
    pub name: String,

    /// 站点标题
    #[arg(short, long)]
    pub title: Option<String>,
}

#[derive(Args)]
pub struct NewArgs {
    /// 文章标题
    pub title: String,

    /// 文章分类，可以重复指定
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// 文章摘要
    #[arg(short, long)]
    pub excerpt: Option<String>,

    /// 创建为草稿，不直接发布
    #[arg(short, long)]
    pub draft: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// 从指定目录导入，缺省用站点的 content 目录
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// 服务器端口
    #[arg(short, long, default_value = "4000")]
    pub port: u16,

    /// 监视主题文件变化并自动重载模板
    #[arg(short, long)]
    pub watch: bool,

    /// 启动前先导入 content 目录
    #[arg(short, long)]
    pub import: bool,
}

// 嵌入的默认配置模板
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# 站点信息
title: {title}
subtitle: '二次元资讯与番剧目录'
description: '用 Rust-Aniverse 搭建的动漫博客'
author: 'Aniverse小编'
language: zh-CN

# URL配置
url: http://localhost:4000
root: /

# 目录配置
data_dir: data
media_dir: media
content_dir: content

# 列表配置
per_page: 6
featured: 4
pagination_window: 2

# 主题配置
theme: default

# 管理接口，配置 token 后开启
# admin_token: 'change-me'

# Feed
feed:
  enable: true
  limit: 20

# 搜索功能
search:
  enable: true
  content: true
"#;

const SAMPLE_POST_WELCOME: &str = r#"---
title: 欢迎来到 Aniverse
slug: hello-aniverse
categories:
  - 站务
excerpt: 这是你的第一篇文章，把它改成自己的故事吧。
---

# 欢迎来到 Aniverse

这是初始化时自动创建的示例文章。

## 接下来可以做什么

``` bash
rust-aniverse new "我的第一篇评测"
rust-aniverse serve --import
```

把 content 目录里的 Markdown 导入后，就能在首页看到它们了。
"#;

const SAMPLE_POST_PREVIEW: &str = r#"---
title: 四月新番前瞻
slug: spring-anime-preview
categories:
  - 新番速递
  - 前瞻
excerpt: 新季度值得关注的几部作品，一次看个够。
---

# 四月新番前瞻

换季啦！先把片单整理出来，追番不迷路。

## 必追榜单

- 续作党的狂欢，重点关注制作组有没有换血
- 原创动画照例是开盲盒，前三集定生死

后续每周会更新观感，欢迎在分类页蹲守。
"#;

// 初始化站点文件结构，包括默认主题和示例文章
fn initialize_site_structure(site_path: &Path, site_title: &str) -> Result<()> {
    let content_dir = site_path.join("content");
    let data_dir = site_path.join("data");
    let media_dir = site_path.join("media");
    let theme_dir = site_path.join("themes").join("default");

    for dir in [&content_dir, &data_dir, &media_dir] {
        fs::create_dir_all(dir)?;
    }

    // 创建默认配置文件
    let config_content = DEFAULT_CONFIG_TEMPLATE.replace("{title}", site_title);
    fs::write(site_path.join("config.yml"), config_content)?;

    // 落地默认主题，方便直接改
    theme::default::write_to(&theme_dir)?;

    // 示例文章
    fs::write(content_dir.join("hello-aniverse.md"), SAMPLE_POST_WELCOME)?;
    fs::write(
        content_dir.join("spring-anime-preview.md"),
        SAMPLE_POST_PREVIEW,
    )?;

    Ok(())
}

/// 监听主题目录，文件变更后重载模板
fn spawn_theme_watcher(app: Arc<App>) -> Result<()> {
    let themes_dir = app.base_dir.join("themes");
    if !themes_dir.exists() {
        warn!("themes 目录不存在，跳过主题监听");
        return Ok(());
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        notify::Config::default(),
    )?;
    watcher.watch(&themes_dir, RecursiveMode::Recursive)?;
    info!("监听主题变更: {}", themes_dir.display());

    tokio::task::spawn_blocking(move || {
        // watcher 随任务一起存活
        let _watcher = watcher;
        while let Ok(event) = rx.recv() {
            if matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                // 编辑器保存往往触发一串事件，合并后只重载一次
                while rx.recv_timeout(Duration::from_millis(500)).is_ok() {}
                info!("主题文件有变更，重新加载模板");
                if let Err(e) = app.reload_templates() {
                    error!("重新加载模板失败: {}", e);
                }
            }
        }
    });

    Ok(())
}

/// 执行命令
pub async fn execute(cli: Cli) -> Result<()> {
    let site_path = cli.path.clone();

    match cli.command {
        Commands::Init(args) => {
            let site_path = site_path.join(&args.name);

            // 如果目录不为空，询问用户是否继续
            if site_path.exists() && site_path.read_dir()?.next().is_some() {
                println!("Directory is not empty. Do you want to continue? (y/N)");
                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;
                if !input.trim().eq_ignore_ascii_case("y") {
                    println!("Operation cancelled.");
                    return Ok(());
                }
            }

            fs::create_dir_all(&site_path)?;

            let site_title = args.title.unwrap_or_else(|| args.name.clone());
            initialize_site_structure(&site_path, &site_title)?;

            info!("Initialized new site at: {}", site_path.display());
            println!(
                "{}",
                format!("站点已创建: {}", site_path.display()).bright_green()
            );
        }
        Commands::New(args) => {
            let app = App::open(&site_path)?;
            let draft = PostDraft {
                title: args.title.clone(),
                slug: None,
                content: format!("# {}\n\n在这里开始你的创作...\n", args.title),
                excerpt: args.excerpt,
                cover_image: None,
                categories: args.categories,
                author: Author {
                    name: app
                        .config
                        .author
                        .clone()
                        .unwrap_or_else(|| "Anonymous".to_string()),
                    image: app.config.author_avatar.clone(),
                },
                published: !args.draft,
            };

            let slug = draft.resolved_slug();
            let id = app.repo.create_post(draft).await?;
            println!(
                "{}",
                format!("文章已创建: /posts/{} (id: {})", slug, id).bright_green()
            );
        }
        Commands::Import(args) => {
            let app = App::open(&site_path)?;
            let imported = match args.dir {
                Some(dir) => app.import_content_from(&dir).await?,
                None => app.import_content().await?,
            };
            println!("{}", format!("导入了 {} 篇文章", imported).bright_green());
        }
        Commands::Serve(args) => {
            let app = Arc::new(App::open(&site_path)?);

            if args.import {
                let imported = app.import_content().await?;
                println!("{}", format!("导入了 {} 篇文章", imported).bright_green());
            }

            if args.watch {
                spawn_theme_watcher(app.clone())?;
            }

            let server = Server::new(app, args.port);
            tokio::select! {
                result = server.start() => result?,
                _ = tokio::signal::ctrl_c() => {
                    info!("收到退出信号，正在停止服务");
                }
            }
        }
    }

    Ok(())
}
