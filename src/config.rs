//! 运行配置
//!
//! 每次调用加载一次并向下传递，不使用全局单例。
//!
//! 加载顺序（后者覆盖前者）：
//! 1. 默认值
//! 2. 配置文件 `~/.config/slack-log-notifier/config.json`
//! 3. 环境变量 `CHANNEL_ID` / `SLACK_API_URL` / `SLACK_TIMEOUT_MS` / `SECRET_NAME` / `AWS_REGION` / `IS_LOCAL`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::NotifierError;
use crate::infra::console::DEFAULT_REGION;
use crate::notification::sanitize::MAX_MESSAGE_CHARS;

/// Slack Web API 基础 URL
pub const SLACK_API_URL: &str = "https://slack.com/api";

/// 默认请求超时（毫秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// 默认密钥名称
pub const DEFAULT_SECRET_NAME: &str = "slack-log-notifier";

/// 控制台链接的默认时间窗口（前后各 10 秒）
pub const DEFAULT_CONSOLE_WINDOW_MS: i64 = 10_000;

/// 通知器配置
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    /// 目标 Slack 频道 ID
    pub channel_id: String,
    /// Slack Web API 基础 URL（测试时指向 mock server）
    pub api_base_url: String,
    /// 单次请求超时（毫秒）
    pub timeout_ms: u64,
    /// 密钥名称
    pub secret_name: String,
    /// CloudWatch 控制台所在区域
    pub region: String,
    /// 控制台链接的时间窗口（毫秒）
    pub console_window_ms: i64,
    /// 单条日志最多显示的字符数
    pub max_message_chars: usize,
    /// 本地模式：不调用 Slack，只打印请求
    pub local: bool,
}

impl NotifierConfig {
    /// 使用默认值创建配置
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            api_base_url: SLACK_API_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
            console_window_ms: DEFAULT_CONSOLE_WINDOW_MS,
            max_message_chars: MAX_MESSAGE_CHARS,
            local: false,
        }
    }

    /// 设置 API 基础 URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// 设置本地模式
    pub fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    /// chat.postMessage 完整 URL
    pub fn post_message_url(&self) -> String {
        format!("{}/chat.postMessage", self.api_base_url.trim_end_matches('/'))
    }

    /// 从默认配置文件和环境变量加载
    pub fn auto_load() -> Result<Self, NotifierError> {
        Self::load(default_config_path().as_deref(), |key| std::env::var(key).ok())
    }

    /// 从指定配置文件和环境变量来源加载
    pub fn load<F>(config_path: Option<&Path>, env: F) -> Result<Self, NotifierError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match config_path {
            Some(path) if path.exists() => ConfigFile::read(path)?,
            _ => ConfigFile::default(),
        };
        let env = |key: &str| env(key).filter(|v| !v.is_empty());

        let channel_id = env("CHANNEL_ID")
            .or(file.channel_id)
            .ok_or_else(|| NotifierError::Config("channel_id is required (set CHANNEL_ID)".to_string()))?;

        let mut config = Self::new(channel_id);

        if let Some(url) = env("SLACK_API_URL").or(file.slack_api_url) {
            config.api_base_url = url;
        }
        if let Some(timeout) = file.timeout_ms {
            config.timeout_ms = timeout;
        }
        if let Some(raw) = env("SLACK_TIMEOUT_MS") {
            config.timeout_ms = raw.parse().map_err(|_| {
                NotifierError::Config(format!("SLACK_TIMEOUT_MS must be a number, got '{}'", raw))
            })?;
        }
        if let Some(name) = env("SECRET_NAME").or(file.secret_name) {
            config.secret_name = name;
        }
        if let Some(region) = env("AWS_REGION").or(file.region) {
            config.region = region;
        }
        if let Some(window) = file.console_window_ms {
            config.console_window_ms = window;
        }
        if let Some(max_chars) = file.max_message_chars {
            config.max_message_chars = max_chars;
        }
        if let Some(local) = file.local {
            config.local = local;
        }
        if let Some(raw) = env("IS_LOCAL") {
            config.local = parse_flag(&raw);
        }

        if config.timeout_ms == 0 {
            return Err(NotifierError::Config("timeout_ms must be greater than 0".to_string()));
        }

        debug!(
            channel = %config.channel_id,
            api_base_url = %config.api_base_url,
            timeout_ms = config.timeout_ms,
            local = config.local,
            "Loaded notifier config"
        );

        Ok(config)
    }
}

/// 配置文件结构（所有字段可选）
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    channel_id: Option<String>,
    slack_api_url: Option<String>,
    timeout_ms: Option<u64>,
    secret_name: Option<String>,
    region: Option<String>,
    console_window_ms: Option<i64>,
    max_message_chars: Option<usize>,
    local: Option<bool>,
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self, NotifierError> {
        let content = fs::read_to_string(path)
            .map_err(|e| NotifierError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Invalid config file");
            NotifierError::Config(format!("invalid config file {}: {}", path.display(), e))
        })
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/slack-log-notifier/config.json"))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "True" | "true" | "TRUE" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_channel_from_env() {
        let config = NotifierConfig::load(None, env_from(&[("CHANNEL_ID", "C123")])).unwrap();
        assert_eq!(config, NotifierConfig::new("C123"));
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.post_message_url(), "https://slack.com/api/chat.postMessage");
    }

    #[test]
    fn test_missing_channel_is_config_error() {
        let err = NotifierConfig::load(None, env_from(&[])).unwrap_err();
        assert!(matches!(err, NotifierError::Config(_)));
    }

    #[test]
    fn test_file_then_env_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"channel_id": "CFILE", "timeout_ms": 3000, "region": "us-west-2", "local": true}"#,
        )
        .unwrap();

        let config = NotifierConfig::load(
            Some(&path),
            env_from(&[("CHANNEL_ID", "CENV"), ("IS_LOCAL", "False")]),
        )
        .unwrap();

        assert_eq!(config.channel_id, "CENV");
        assert_eq!(config.timeout_ms, 3000);
        assert_eq!(config.region, "us-west-2");
        assert!(!config.local);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = NotifierConfig::load(
            None,
            env_from(&[("CHANNEL_ID", "C1"), ("SLACK_TIMEOUT_MS", "soon")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("SLACK_TIMEOUT_MS"));
    }

    #[test]
    fn test_post_message_url_trims_slash() {
        let config = NotifierConfig::new("C1").with_api_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.post_message_url(), "http://127.0.0.1:9000/chat.postMessage");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("True"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("False"));
        assert!(!parse_flag(""));
    }
}
