//! invoke 命令 - 处理一个触发事件

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use tracing::{error, info};

use super::output::read_json_input;
use crate::config::NotifierConfig;
use crate::handler::{handle_trigger, Notifier};

/// invoke 命令参数
#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// 触发事件 JSON 文件（默认从 stdin 读取）
    #[arg(long, short)]
    pub file: Option<PathBuf>,
    /// 本地模式：只打印请求，不调用 Slack
    #[arg(long)]
    pub local: bool,
    /// 调用失败时以非零状态退出（默认总是成功退出）
    #[arg(long)]
    pub fail_on_error: bool,
}

/// 处理 invoke 命令
pub fn handle_invoke(args: InvokeArgs) -> Result<()> {
    let event = read_json_input(args.file.as_deref())?;

    let notifier = NotifierConfig::auto_load()
        .map(|config| if args.local { config.with_local(true) } else { config })
        .and_then(Notifier::from_config);

    let notifier = match notifier {
        Ok(notifier) => notifier,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Cannot set up notifier");
            if args.fail_on_error {
                bail!("cannot set up notifier: {}", e);
            }
            return Ok(());
        }
    };

    info!(channel = %notifier.config().channel_id, "Handling trigger event");

    if let Err(failure) = handle_trigger(&notifier, &event) {
        if args.fail_on_error {
            bail!(failure);
        }
    }

    Ok(())
}
