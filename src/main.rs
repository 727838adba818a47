//! Island Bridge CLI
//!
//! 回放通知事件并查看岛屿输出

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use island_bridge::cli::{format_output, handle_classify, handle_replay, ClassifyArgs, ReplayArgs};
use island_bridge::BridgeConfig;

#[derive(Parser)]
#[command(name = "island-bridge")]
#[command(about = "Island Bridge - 把系统通知桥接到岛屿显示面")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 回放事件文件并打印岛屿输出
    Replay(ReplayArgs),
    /// 打印每个事件的过滤与分类结果
    Classify(ClassifyArgs),
    /// 显示生效的配置
    Config {
        /// 配置文件路径
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 通过 RUST_LOG 控制日志级别，默认为 info
    // 例如: RUST_LOG=island_bridge=debug island-bridge replay events.jsonl
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("island_bridge=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(args) => handle_replay(args).await?,
        Commands::Classify(args) => handle_classify(args)?,
        Commands::Config { config } => {
            let path = config.clone().or_else(BridgeConfig::default_path);
            let effective = BridgeConfig::load_or_default(config.as_deref())?;
            match path {
                Some(p) => eprintln!("配置文件: {}", p.display()),
                None => eprintln!("配置文件: (无)"),
            }
            println!("{}", format_output(&effective, true));
        }
    }

    Ok(())
}
