use agri_article_writer::utils::logging;
use agri_article_writer::{App, Config};
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).run().await?;

    Ok(())
}
