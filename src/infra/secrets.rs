//! 密钥读取
//!
//! 密钥内容是一个 JSON 文档，至少包含 `SLACK_TOKEN`。
//!
//! `LocalSecretStore` 读取优先级：
//! 1. 密钥文件 `~/.config/slack-log-notifier/secrets/<name>.json`
//! 2. 环境变量 `SLACK_TOKEN`

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::NotifierError;

/// Slack token 环境变量
pub const ENV_SLACK_TOKEN: &str = "SLACK_TOKEN";

/// 密钥内容
#[derive(Clone, Deserialize)]
pub struct Secrets {
    /// Slack Bot token
    #[serde(rename = "SLACK_TOKEN")]
    pub slack_token: String,
    /// 其他字段（原样保留）
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Secrets {
    pub fn new(slack_token: impl Into<String>) -> Self {
        Self {
            slack_token: slack_token.into(),
            extra: HashMap::new(),
        }
    }
}

// token 不能出现在日志里
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("slack_token", &"***")
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 密钥存储
pub trait SecretStore: Send + Sync {
    /// 按名称读取密钥
    fn get_secret(&self, name: &str) -> Result<Secrets, NotifierError>;
}

/// 本地密钥存储（文件 + 环境变量）
#[derive(Debug, Clone)]
pub struct LocalSecretStore {
    /// 密钥目录，None 时使用默认目录
    secrets_dir: Option<PathBuf>,
    /// 是否回退到环境变量
    use_env: bool,
}

impl LocalSecretStore {
    /// 默认目录 + 环境变量
    pub fn new() -> Self {
        Self {
            secrets_dir: None,
            use_env: true,
        }
    }

    /// 指定密钥目录
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.secrets_dir = Some(dir.into());
        self
    }

    /// 设置是否回退到环境变量
    pub fn with_env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    fn resolve_dir(&self) -> Option<PathBuf> {
        self.secrets_dir.clone().or_else(|| {
            dirs::home_dir().map(|home| home.join(".config/slack-log-notifier/secrets"))
        })
    }

    fn unavailable(name: &str, reason: impl Into<String>) -> NotifierError {
        NotifierError::SecretUnavailable {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl Default for LocalSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for LocalSecretStore {
    fn get_secret(&self, name: &str) -> Result<Secrets, NotifierError> {
        // 1. 密钥文件
        if let Some(dir) = self.resolve_dir() {
            let path = dir.join(format!("{}.json", name));
            if path.exists() {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Self::unavailable(name, format!("cannot read {}: {}", path.display(), e))
                })?;
                let secrets: Secrets = serde_json::from_str(&content).map_err(|e| {
                    Self::unavailable(name, format!("invalid secret JSON in {}: {}", path.display(), e))
                })?;
                if secrets.slack_token.is_empty() {
                    return Err(Self::unavailable(name, "SLACK_TOKEN is empty"));
                }
                debug!(secret = %name, path = %path.display(), "Loaded secret from file");
                return Ok(secrets);
            }
        }

        // 2. 环境变量
        if self.use_env {
            if let Ok(token) = std::env::var(ENV_SLACK_TOKEN) {
                if !token.is_empty() {
                    debug!(secret = %name, "Using SLACK_TOKEN from environment");
                    return Ok(Secrets::new(token));
                }
            }
        }

        Err(Self::unavailable(
            name,
            "no secret file found and SLACK_TOKEN is not set",
        ))
    }
}
