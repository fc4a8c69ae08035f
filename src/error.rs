//! 错误类型
//!
//! 所有错误都不可重试：一旦出现，本次调用中剩余的发送全部放弃。

use thiserror::Error;

/// 通知转发过程中的错误
#[derive(Debug, Error)]
pub enum NotifierError {
    /// 必需字段缺失（列出所有缺失路径，而不仅是第一个）
    #[error("malformed awslogs envelope, missing keys: {}", .missing.join(", "))]
    MalformedEnvelope { missing: Vec<String> },

    /// logEvents 为空
    #[error("malformed awslogs envelope: logEvents is empty")]
    EmptyLogEvents,

    /// base64 / gzip / JSON 解码失败
    #[error("invalid awslogs payload: {0}")]
    InvalidPayload(String),

    /// Slack 响应缺少 message.ts 等必需字段
    #[error("unexpected Slack API response: {0}")]
    ProtocolViolation(String),

    /// Slack 返回 ok: false
    #[error("Slack API rejected the message: {error}")]
    DeliveryFailure { error: String },

    /// 无法读取密钥
    #[error("secret '{name}' unavailable: {reason}")]
    SecretUnavailable { name: String, reason: String },

    /// 配置缺失或不合法
    #[error("invalid configuration: {0}")]
    Config(String),

    /// HTTP 传输失败（连接、超时、非 2xx 状态）
    #[error("transport error: {0}")]
    Transport(String),
}

impl NotifierError {
    /// 用于结构化日志的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope { .. } => "malformed_envelope",
            Self::EmptyLogEvents => "empty_log_events",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::ProtocolViolation(_) => "protocol_violation",
            Self::DeliveryFailure { .. } => "delivery_failure",
            Self::SecretUnavailable { .. } => "secret_unavailable",
            Self::Config(_) => "config",
            Self::Transport(_) => "transport",
        }
    }

    /// 是否属于信封格式错误（解码阶段）
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedEnvelope { .. } | Self::EmptyLogEvents | Self::InvalidPayload(_)
        )
    }
}
