use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::error;
use tracing_subscriber::fmt;

use rust_aniverse::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    fmt()
        .with_target(false)
        .init();

    // 解析命令行参数
    let cli = cli::Cli::parse();

    // 打印欢迎信息
    println!("{}", "
    _          _
   / \\   _ __ (_)_   _____ _ __ ___  ___
  / _ \\ | '_ \\| \\ \\ / / _ \\ '__/ __|/ _ \\
 / ___ \\| | | | |\\ V /  __/ |  \\__ \\  __/
/_/   \\_\\_| |_|_| \\_/ \\___|_|  |___/\\___|
    ".bright_magenta());

    println!(
        "{} {}",
        "Rust-Aniverse".bright_magenta(),
        env!("CARGO_PKG_VERSION").bright_green()
    );
    println!("{}", "An anime blog & catalog engine written in Rust".bright_white());
    println!();

    // 执行命令
    if let Err(e) = cli::execute(cli).await {
        error!("Error: {}", e);

        // 打印错误链
        let mut source = e.source();
        while let Some(e) = source {
            error!("Caused by: {}", e);
            source = e.source();
        }

        std::process::exit(1);
    }

    Ok(())
}
