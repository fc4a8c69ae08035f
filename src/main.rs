//! Slack Log Notifier CLI
//!
//! 把 CloudWatch Logs 订阅推送转发为 Slack 线程通知

use anyhow::Result;
use clap::{Parser, Subcommand};
use slack_log_notifier::cli::{
    handle_decode, handle_encode, handle_invoke, DecodeArgs, EncodeArgs, InvokeArgs,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sln")]
#[command(about = "Slack Log Notifier - 把 CloudWatch Logs 推送转发为 Slack 线程通知")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 处理一个 awslogs 触发事件并发送 Slack 通知
    Invoke(InvokeArgs),
    /// 解码触发事件，输出信封 JSON
    Decode(DecodeArgs),
    /// 把信封 JSON 编码为触发事件（本地测试用）
    Encode(EncodeArgs),
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("slack_log_notifier=info,sln=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Invoke(args) => handle_invoke(args)?,
        Commands::Decode(args) => handle_decode(args)?,
        Commands::Encode(args) => handle_encode(args)?,
    }

    Ok(())
}
