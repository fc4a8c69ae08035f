//! decode / encode 命令 - 调试用的信封编解码

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::output::{format_json, read_json_input};
use crate::envelope::{decode_trigger, encode_envelope};

/// decode 命令参数
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// 触发事件 JSON 文件（默认从 stdin 读取）
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}

/// encode 命令参数
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// 信封 JSON 文件（默认从 stdin 读取）
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}

/// 解码触发事件并输出信封
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    let event = read_json_input(args.file.as_deref())?;
    let envelope = decode_trigger(&event)?;
    println!("{}", format_json(&envelope));
    Ok(())
}

/// 把信封编码为触发事件
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    let data = read_json_input(args.file.as_deref())?;
    let event = encode_envelope(&data)?;
    println!("{}", format_json(&event));
    Ok(())
}
