use anyhow::Result;
use clap::Parser;
use ket_writing_examiner::app::{App, CliArgs};
use ket_writing_examiner::config::Config;
use ket_writing_examiner::logger;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 解析参数并加载配置
    let args = CliArgs::parse();
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config)?.run(&args).await?;

    Ok(())
}
