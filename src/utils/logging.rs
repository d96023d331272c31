//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式下为 `debug`。
/// 日志写到 stderr，避免和交互界面混在一起。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "🔍 搜索模型: {} ({})",
        config.search_model_name, config.search_api_base_url
    );
    info!(
        "✍️ 生成模型: {} ({})",
        config.generation_model_name, config.generation_api_base_url
    );
    info!("📁 导出目录: {}", config.output_dir);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
