//! 调用处理 - 一个触发事件对应一次调用
//!
//! 状态流转：
//! `Decode → ValidateKeys → LoadSecrets → BuildRoot → SendRoot → InspectResponse
//!  → [BuildNext → SendNext → InspectResponse]* → Done`
//!
//! 任何一步出错都转入 `Failed`。已经发出的消息不会撤回。
//! 所有发送严格串行：下一条消息依赖上一条的响应（线程 ts 和失败检测）。

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::NotifierConfig;
use crate::envelope::{decode_payload, validate_envelope};
use crate::error::NotifierError;
use crate::infra::console::build_log_console_url;
use crate::infra::secrets::{LocalSecretStore, SecretStore};
use crate::notification::{
    HttpTransport, LocalTransport, MessageFormatter, MessageTransport, SlackClient,
};

/// 调用状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Decode,
    ValidateKeys,
    LoadSecrets,
    BuildRoot,
    SendRoot,
    InspectResponse,
    /// 构建第 n 条日志的回复（从 0 开始）
    BuildNext(usize),
    /// 发送第 n 条日志的回复（从 0 开始）
    SendNext(usize),
    Done,
    Failed,
}

impl fmt::Display for InvocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => write!(f, "decode"),
            Self::ValidateKeys => write!(f, "validate_keys"),
            Self::LoadSecrets => write!(f, "load_secrets"),
            Self::BuildRoot => write!(f, "build_root"),
            Self::SendRoot => write!(f, "send_root"),
            Self::InspectResponse => write!(f, "inspect_response"),
            Self::BuildNext(index) => write!(f, "build_next[{}]", index),
            Self::SendNext(index) => write!(f, "send_next[{}]", index),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// 成功完成的调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationReport {
    /// 根消息的 ts（控制消息被跳过时为 None）
    pub thread_ts: Option<String>,
    /// 已发出的请求数
    pub documents_sent: usize,
    /// 已发到线程中的日志条数
    pub events_processed: usize,
    /// 是否因控制消息而跳过
    pub skipped: bool,
    /// 经过的状态
    pub trail: Vec<InvocationState>,
}

/// 失败的调用
#[derive(Debug, Error)]
#[error("invocation failed in state {state}: {source}")]
pub struct InvocationFailure {
    /// 出错时所处的状态
    pub state: InvocationState,
    /// 出错前已发出的请求数（包括失败通知）
    pub documents_sent: usize,
    /// 经过的状态（最后一个为 Failed）
    pub trail: Vec<InvocationState>,
    pub source: NotifierError,
}

/// 调用进度
#[derive(Default)]
struct Progress {
    trail: Vec<InvocationState>,
    sent: usize,
    events: usize,
    skipped: bool,
}

impl Progress {
    fn enter(&mut self, state: InvocationState) {
        debug!(state = %state, "Invocation state");
        self.trail.push(state);
    }

    fn current(&self) -> InvocationState {
        self.trail.last().copied().unwrap_or(InvocationState::Decode)
    }
}

/// 日志通知器
pub struct Notifier {
    config: NotifierConfig,
    secrets: Arc<dyn SecretStore>,
    transport: Arc<dyn MessageTransport>,
    formatter: MessageFormatter,
}

impl Notifier {
    pub fn new(
        config: NotifierConfig,
        secrets: Arc<dyn SecretStore>,
        transport: Arc<dyn MessageTransport>,
    ) -> Self {
        let formatter = MessageFormatter::new().with_max_message_chars(config.max_message_chars);
        Self {
            config,
            secrets,
            transport,
            formatter,
        }
    }

    /// 按配置选择传输（本地模式 / HTTPS），密钥从本地存储读取
    pub fn from_config(config: NotifierConfig) -> Result<Self, NotifierError> {
        let transport: Arc<dyn MessageTransport> = if config.local {
            info!("Local mode: messages are logged, not sent");
            Arc::new(LocalTransport::new())
        } else {
            Arc::new(HttpTransport::new(config.timeout_ms)?)
        };

        Ok(Self::new(config, Arc::new(LocalSecretStore::new()), transport))
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// 处理一个触发事件
    pub fn run(&self, event: &Value) -> Result<InvocationReport, InvocationFailure> {
        let mut progress = Progress::default();

        match self.execute(event, &mut progress) {
            Ok(thread_ts) => {
                progress.enter(InvocationState::Done);
                Ok(InvocationReport {
                    thread_ts,
                    documents_sent: progress.sent,
                    events_processed: progress.events,
                    skipped: progress.skipped,
                    trail: progress.trail,
                })
            }
            Err(source) => {
                let state = progress.current();
                progress.enter(InvocationState::Failed);
                Err(InvocationFailure {
                    state,
                    documents_sent: progress.sent,
                    trail: progress.trail,
                    source,
                })
            }
        }
    }

    fn execute(
        &self,
        event: &Value,
        progress: &mut Progress,
    ) -> Result<Option<String>, NotifierError> {
        progress.enter(InvocationState::Decode);
        let data = decode_payload(event)?;

        progress.enter(InvocationState::ValidateKeys);
        let envelope = validate_envelope(data)?;
        info!(
            log_group = %envelope.log_group,
            log_stream = %envelope.log_stream,
            filters = %envelope.filter_names(),
            events = envelope.log_events.len(),
            "Decoded log envelope"
        );

        if envelope.is_control() {
            info!(log_group = %envelope.log_group, "Control message, nothing to notify");
            progress.skipped = true;
            return Ok(None);
        }

        progress.enter(InvocationState::LoadSecrets);
        let secrets = self.secrets.get_secret(&self.config.secret_name)?;

        progress.enter(InvocationState::BuildRoot);
        // 同一批日志的 timestamp 相同，取第一条
        let timestamp = envelope
            .first_event()
            .map(|e| e.timestamp)
            .ok_or(NotifierError::EmptyLogEvents)?;
        let console_url = build_log_console_url(
            &self.config.region,
            &envelope.log_group,
            &envelope.log_stream,
            Some(timestamp),
            Some(self.config.console_window_ms),
        );
        let root = self.formatter.root_document(&envelope, &console_url);

        let client = SlackClient::new(
            self.transport.as_ref(),
            self.config.post_message_url(),
            secrets.slack_token.as_str(),
            self.config.channel_id.as_str(),
        );
        let fallback = || self.formatter.fallback_document(timestamp);

        progress.enter(InvocationState::SendRoot);
        let response = client.send(&root, None);
        progress.sent = client.sent_count();
        let response = response?;

        progress.enter(InvocationState::InspectResponse);
        let acknowledged = client.acknowledge(&response, &fallback);
        progress.sent = client.sent_count();
        let thread_ts = acknowledged?;
        info!(channel = %client.channel(), thread_ts = %thread_ts, "Thread started");

        for (index, log_event) in envelope.log_events.iter().enumerate() {
            progress.enter(InvocationState::BuildNext(index));
            debug!(index, id = %log_event.id, "Formatting log event");
            let document = self.formatter.event_document(&envelope, index, log_event);

            progress.enter(InvocationState::SendNext(index));
            let response = client.send(&document, Some(&thread_ts));
            progress.sent = client.sent_count();
            let response = response?;

            progress.enter(InvocationState::InspectResponse);
            let acknowledged = client.acknowledge(&response, &fallback);
            progress.sent = client.sent_count();
            acknowledged?;

            progress.events += 1;
        }

        Ok(Some(thread_ts))
    }
}

/// 触发入口：记录结果日志后原样返回
///
/// 调用方应忽略返回的错误（触发方始终视为成功），错误只用于观测。
pub fn handle_trigger(
    notifier: &Notifier,
    event: &Value,
) -> Result<InvocationReport, InvocationFailure> {
    debug!(event = %event, "Received trigger event");

    let outcome = notifier.run(event);
    match &outcome {
        Ok(report) => {
            info!(
                thread_ts = ?report.thread_ts,
                documents_sent = report.documents_sent,
                events = report.events_processed,
                skipped = report.skipped,
                "Invocation completed"
            );
        }
        Err(failure) => {
            let trail: Vec<String> = failure.trail.iter().map(|s| s.to_string()).collect();
            error!(
                kind = failure.source.kind(),
                state = %failure.state,
                documents_sent = failure.documents_sent,
                trail = %trail.join(" -> "),
                error = %failure.source,
                "Invocation failed"
            );
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(InvocationState::SendNext(2).to_string(), "send_next[2]");
        assert_eq!(InvocationState::InspectResponse.to_string(), "inspect_response");
    }

    #[test]
    fn test_progress_current_defaults_to_decode() {
        let mut progress = Progress::default();
        assert_eq!(progress.current(), InvocationState::Decode);
        progress.enter(InvocationState::SendRoot);
        assert_eq!(progress.current(), InvocationState::SendRoot);
    }
}
