//! Slack chat.postMessage 客户端 - 发送文档并检查送达确认
//!
//! 确认协议：
//! 1. 响应 `ok == false` → 发送一条不挂线程的失败通知（失败也只记录日志），然后中止本次调用
//! 2. 响应缺少 `message.ts` → `ProtocolViolation`，中止本次调用
//! 3. 否则返回 `message.ts`，根消息的 ts 作为后续所有回复的 thread_ts

use std::cell::Cell;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::blocks::{Block, NotificationDocument};
use super::transport::{MessageTransport, RawResponse};
use crate::error::NotifierError;

/// chat.postMessage 请求体
#[derive(Debug, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub blocks: &'a [Block],
    /// 要挂到哪个线程下
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<&'a str>,
}

#[derive(Deserialize)]
struct PostMessageBody {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<AckMessage>,
}

#[derive(Deserialize)]
struct AckMessage {
    #[serde(default)]
    ts: Option<String>,
}

/// 解析后的 Slack 响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    pub ok: bool,
    /// `message.ts`
    pub ts: Option<String>,
    /// `ok == false` 时的错误码（如 `channel_not_found`）
    pub error: Option<String>,
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl DeliveryResponse {
    /// 解析原始响应；body 不是 JSON 或缺少 `ok` 时视为协议错误
    pub fn parse(raw: &RawResponse) -> Result<Self, NotifierError> {
        let body: PostMessageBody = serde_json::from_str(&raw.body).map_err(|e| {
            NotifierError::ProtocolViolation(format!("cannot parse response body ({}): {}", e, raw.body))
        })?;

        Ok(Self {
            ok: body.ok,
            ts: body.message.and_then(|m| m.ts),
            error: body.error,
            status: raw.status,
            headers: raw.headers.clone(),
        })
    }

    /// 送达确认的 `message.ts`
    pub fn acknowledged_ts(&self) -> Result<&str, NotifierError> {
        self.ts.as_deref().ok_or_else(|| {
            NotifierError::ProtocolViolation("message.ts is required in the response".to_string())
        })
    }
}

/// Slack 发送客户端（单次调用内使用）
pub struct SlackClient<'a> {
    transport: &'a dyn MessageTransport,
    url: String,
    token: String,
    channel: String,
    sent: Cell<usize>,
}

impl<'a> SlackClient<'a> {
    pub fn new(
        transport: &'a dyn MessageTransport,
        url: impl Into<String>,
        token: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            url: url.into(),
            token: token.into(),
            channel: channel.into(),
            sent: Cell::new(0),
        }
    }

    /// 目标频道
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// 已成功送出的请求数（含失败通知）
    pub fn sent_count(&self) -> usize {
        self.sent.get()
    }

    /// 发送文档，`thread_ts` 为 None 时作为新消息发送
    pub fn send(
        &self,
        document: &NotificationDocument,
        thread_ts: Option<&str>,
    ) -> Result<DeliveryResponse, NotifierError> {
        let request = PostMessageRequest {
            channel: &self.channel,
            blocks: document.blocks(),
            thread_ts,
        };
        let body = serde_json::to_vec(&request).map_err(|e| {
            NotifierError::Transport(format!("Failed to serialize request: {}", e))
        })?;

        debug!(
            transport = self.transport.name(),
            channel = %self.channel,
            thread_ts = ?thread_ts,
            blocks = document.len(),
            "Posting message"
        );

        let raw = self.transport.post(&self.url, &self.token, &body)?;
        self.sent.set(self.sent.get() + 1);

        info!(
            status = raw.status,
            headers = ?raw.headers,
            body = %raw.body,
            "Slack API response"
        );

        DeliveryResponse::parse(&raw)
    }

    /// 检查送达确认，成功时返回 `message.ts`
    ///
    /// `ok == false` 时调用 `fallback` 构建失败通知并发送到同一频道（不挂线程），
    /// 这次发送的任何错误都只记录日志；随后返回 `DeliveryFailure`。
    pub fn acknowledge<F>(
        &self,
        response: &DeliveryResponse,
        fallback: F,
    ) -> Result<String, NotifierError>
    where
        F: FnOnce() -> NotificationDocument,
    {
        if !response.ok {
            let reason = response
                .error
                .clone()
                .unwrap_or_else(|| "unknown_error".to_string());
            warn!(
                channel = %self.channel,
                error = %reason,
                "Slack API returned ok=false, sending fallback alert"
            );

            match self.send(&fallback(), None) {
                Ok(fallback_response) if fallback_response.ok => {
                    info!(channel = %self.channel, "Fallback alert sent");
                }
                Ok(fallback_response) => {
                    error!(
                        channel = %self.channel,
                        error = ?fallback_response.error,
                        "Fallback alert was rejected"
                    );
                }
                Err(e) => {
                    error!(channel = %self.channel, error = %e, "Failed to send fallback alert");
                }
            }

            return Err(NotifierError::DeliveryFailure { error: reason });
        }

        response.acknowledged_ts().map(str::to_string)
    }
}
