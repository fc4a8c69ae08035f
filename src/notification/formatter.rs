//! 消息格式化 - 把信封转换为 Slack 通知文档
//!
//! 一个信封对应一条根消息加 N 条线程回复：
//! - 根消息：订阅过滤器名称 + 「LogStream URL」按钮（说明文字为第一条日志的摘要）
//! - 第 i 条回复：「ログメッセージ i」（第一条回复前面还有日志组名和日志流名）
//! - 发送失败时：一条独立的失败通知

use super::blocks::NotificationDocument;
use super::sanitize::{root_description, strip_ansi, truncate_message, MAX_MESSAGE_CHARS};
use crate::envelope::{LogEnvelope, LogEvent};
use crate::infra::time::to_local_display;

/// 通知文案（日文）
pub mod msg {
    pub const LOG_STREAM_URL: &str = "LogStream URL";
    pub const LOG_GROUP_NAME: &str = "ロググループ名";
    pub const LOG_STREAM_NAME: &str = "ログストリーム名";
    pub const LOG_MESSAGE: &str = "ログメッセージ";

    pub const DELIVERY_FAILED: &str = "slack通知に失敗しました";
    pub const MESSAGE: &str = "メッセージ";
    pub const CHECK_LOGS: &str = "詳細はCloudWatchログを確認してください。";
    pub const OCCURRED_AT: &str = "発生時間";
}

/// 消息格式化器
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    /// 单条日志最多显示的字符数
    max_message_chars: usize,
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self {
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }

    /// 设置单条日志的字符上限
    pub fn with_max_message_chars(mut self, max_chars: usize) -> Self {
        self.max_message_chars = max_chars;
        self
    }

    /// 线程根消息
    pub fn root_document(&self, envelope: &LogEnvelope, console_url: &str) -> NotificationDocument {
        let description = envelope
            .first_event()
            .map(|event| root_description(&event.message))
            .unwrap_or_default();

        NotificationDocument::with_text(envelope.filter_names()).button(
            msg::LOG_STREAM_URL,
            console_url,
            &description,
        )
    }

    /// 第 `index` 条日志（从 0 开始）的线程回复
    pub fn event_document(
        &self,
        envelope: &LogEnvelope,
        index: usize,
        event: &LogEvent,
    ) -> NotificationDocument {
        let message = truncate_message(&strip_ansi(&event.message), self.max_message_chars);

        let mut document = NotificationDocument::new();
        if index == 0 {
            document = document
                .field(msg::LOG_GROUP_NAME, &envelope.log_group)
                .field(msg::LOG_STREAM_NAME, &envelope.log_stream);
        }

        document.field(&format!("{} {}", msg::LOG_MESSAGE, index + 1), &message)
    }

    /// 发送失败时的告警
    pub fn fallback_document(&self, timestamp_ms: i64) -> NotificationDocument {
        NotificationDocument::with_text(msg::DELIVERY_FAILED)
            .field(msg::MESSAGE, msg::CHECK_LOGS)
            .field(msg::OCCURRED_AT, &to_local_display(timestamp_ms))
    }
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::MessageType;
    use crate::notification::blocks::{Block, RichTextElement, RichTextSpan, TextObject};

    fn envelope(messages: &[&str]) -> LogEnvelope {
        LogEnvelope {
            message_type: MessageType::DataMessage,
            owner: "123456789012".to_string(),
            log_group: "/aws/lambda/site-api".to_string(),
            log_stream: "2023/05/04/[$LATEST]14aa".to_string(),
            subscription_filters: vec!["error-log".to_string()],
            log_events: messages
                .iter()
                .enumerate()
                .map(|(i, m)| LogEvent {
                    id: i.to_string(),
                    timestamp: 1683213799433,
                    message: m.to_string(),
                })
                .collect(),
        }
    }

    /// 取出富文本区块的（标题, 内容）
    fn field_of(block: &Block) -> (String, String) {
        match block {
            Block::RichText { elements } => match &elements[0] {
                RichTextElement::RichTextSection { elements } => {
                    let texts: Vec<String> = elements
                        .iter()
                        .map(|RichTextSpan::Text { text, .. }| text.clone())
                        .collect();
                    (texts[0].clone(), texts[1].clone())
                }
            },
            other => panic!("not a field block: {other:?}"),
        }
    }

    #[test]
    fn test_root_document() {
        let first = format!("{}{}", "2023-05-06T01:55:50.034Z\t\t", "z".repeat(120));
        let env = envelope(&[&first]);
        let doc = MessageFormatter::new().root_document(&env, "https://console/url");

        assert_eq!(doc.len(), 2);
        match &doc.blocks()[0] {
            Block::Section { text, accessory } => {
                assert_eq!(text, &TextObject::plain("error-log"));
                assert!(accessory.is_none());
            }
            other => panic!("unexpected block: {other:?}"),
        }
        match &doc.blocks()[1] {
            Block::Section { text, accessory } => {
                assert_eq!(text.text(), "z".repeat(80));
                assert!(accessory.is_some());
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn test_first_event_document_has_context_blocks() {
        let env = envelope(&["\x1b[31mfirst\x1b[0m", "second"]);
        let formatter = MessageFormatter::new();

        let doc = formatter.event_document(&env, 0, &env.log_events[0]);
        assert_eq!(doc.len(), 3);
        assert_eq!(
            field_of(&doc.blocks()[0]),
            ("ロググループ名 : \n".to_string(), "/aws/lambda/site-api".to_string())
        );
        assert_eq!(
            field_of(&doc.blocks()[1]),
            ("ログストリーム名 : \n".to_string(), "2023/05/04/[$LATEST]14aa".to_string())
        );
        assert_eq!(
            field_of(&doc.blocks()[2]),
            ("ログメッセージ 1 : \n".to_string(), "first".to_string())
        );

        let doc = formatter.event_document(&env, 1, &env.log_events[1]);
        assert_eq!(doc.len(), 1);
        assert_eq!(field_of(&doc.blocks()[0]).0, "ログメッセージ 2 : \n");
    }

    #[test]
    fn test_event_document_truncates_long_message() {
        let long = "m".repeat(1050);
        let env = envelope(&[&long]);
        let doc = MessageFormatter::new().event_document(&env, 0, &env.log_events[0]);
        let (_, value) = field_of(&doc.blocks()[2]);
        assert_eq!(value, format!("{}...", "m".repeat(1000)));
    }

    #[test]
    fn test_empty_message_drops_block() {
        let env = envelope(&["\x1b[0m"]);
        let doc = MessageFormatter::new().event_document(&env, 0, &env.log_events[0]);
        // 只剩日志组名和日志流名
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_custom_limit() {
        let env = envelope(&["abcdef"]);
        let doc = MessageFormatter::new()
            .with_max_message_chars(3)
            .event_document(&env, 0, &env.log_events[0]);
        assert_eq!(field_of(&doc.blocks()[2]).1, "abc...");
    }

    #[test]
    fn test_fallback_document() {
        let doc = MessageFormatter::new().fallback_document(1683213799433);
        assert_eq!(doc.len(), 3);
        assert_eq!(
            field_of(&doc.blocks()[1]).1,
            "詳細はCloudWatchログを確認してください。"
        );
        assert_eq!(field_of(&doc.blocks()[2]).1, "2023-05-05T00:23:19.433+09:00");
    }
}
