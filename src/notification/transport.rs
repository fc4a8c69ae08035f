//! 传输层 - 把序列化好的请求体送到 Slack
//!
//! - `HttpTransport`：真实 HTTPS 请求（同步、带超时）
//! - `LocalTransport`：本地模式，只记录请求并返回模拟的成功响应

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info};

use crate::error::NotifierError;

/// 请求体的 Content-Type
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// 原始 HTTP 响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    /// 200 + JSON body
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.into(),
        }
    }
}

/// 消息传输 trait
pub trait MessageTransport: Send + Sync {
    /// 传输名称（用于日志）
    fn name(&self) -> &str;

    /// 以 Bearer token 认证 POST JSON 请求体，阻塞直到收到响应或超时
    fn post(&self, url: &str, token: &str, body: &[u8]) -> Result<RawResponse, NotifierError>;
}

/// 基于 reqwest 的 HTTPS 传输
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// 创建传输，`timeout_ms` 作用于每一次请求
    pub fn new(timeout_ms: u64) -> Result<Self, NotifierError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| NotifierError::Transport(format!("Cannot create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl MessageTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn post(&self, url: &str, token: &str, body: &[u8]) -> Result<RawResponse, NotifierError> {
        let start = std::time::Instant::now();
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body.to_vec())
            .send()
            .map_err(|e| {
                NotifierError::Transport(format!(
                    "request to {} failed after {}ms: {}",
                    url,
                    start.elapsed().as_millis(),
                    e
                ))
            })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        // 读完 body 后连接即释放
        let body = response
            .text()
            .map_err(|e| NotifierError::Transport(format!("Failed to read response: {}", e)))?;

        debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            "Slack API request completed"
        );

        if !status.is_success() {
            return Err(NotifierError::Transport(format!(
                "Slack API returned HTTP {}: {}",
                status, body
            )));
        }

        Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

/// 本地模式传输，不发出任何网络请求
#[derive(Debug, Default)]
pub struct LocalTransport {
    sequence: AtomicU64,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已处理的请求数
    pub fn request_count(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

impl MessageTransport for LocalTransport {
    fn name(&self) -> &str {
        "local"
    }

    fn post(&self, url: &str, _token: &str, body: &[u8]) -> Result<RawResponse, NotifierError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            url = %url,
            method = "POST",
            body = %String::from_utf8_lossy(body),
            "[LOCAL] Would post message"
        );

        let ts = format!("{}.{:06}", Utc::now().timestamp(), seq);
        let response = serde_json::json!({
            "ok": true,
            "message": { "ts": ts }
        });
        Ok(RawResponse::ok_json(response.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_transport_acknowledges_every_post() {
        let transport = LocalTransport::new();
        let first = transport.post("http://local/chat.postMessage", "t", b"{}").unwrap();
        let second = transport.post("http://local/chat.postMessage", "t", b"{}").unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(transport.request_count(), 2);

        let first: serde_json::Value = serde_json::from_str(&first.body).unwrap();
        let second: serde_json::Value = serde_json::from_str(&second.body).unwrap();
        assert_eq!(first["ok"], true);
        assert!(first["message"]["ts"].as_str().unwrap().ends_with(".000001"));
        assert_ne!(first["message"]["ts"], second["message"]["ts"]);
    }

    #[test]
    fn test_http_transport_creation() {
        assert!(HttpTransport::new(5000).is_ok());
    }
}
