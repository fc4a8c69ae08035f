//! 信封数据模型

use serde::{Deserialize, Serialize};

/// 订阅消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// 普通日志数据
    DataMessage,
    /// 创建订阅时发送的连通性探测
    ControlMessage,
    #[serde(other)]
    Unknown,
}

/// 一条日志
///
/// 同一信封中的多条日志经常共享同一个 timestamp（日志源批量投递）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub id: String,
    /// 毫秒级 Unix 时间戳（UTC）
    pub timestamp: i64,
    /// 原始日志内容，可能包含 ANSI 转义序列
    pub message: String,
}

/// 解码后的 awslogs 信封（只读）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEnvelope {
    pub message_type: MessageType,
    pub owner: String,
    pub log_group: String,
    pub log_stream: String,
    pub subscription_filters: Vec<String>,
    pub log_events: Vec<LogEvent>,
}

impl LogEnvelope {
    /// 第一条日志（校验后保证存在）
    pub fn first_event(&self) -> Option<&LogEvent> {
        self.log_events.first()
    }

    /// 是否为控制消息
    pub fn is_control(&self) -> bool {
        self.message_type == MessageType::ControlMessage
    }

    /// 订阅过滤器名称，逗号分隔
    pub fn filter_names(&self) -> String {
        self.subscription_filters.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_envelope() {
        let json = serde_json::json!({
            "messageType": "DATA_MESSAGE",
            "owner": "123456789012",
            "logGroup": "/aws/lambda/site-api",
            "logStream": "2023/05/04/[$LATEST]14aa2621",
            "subscriptionFilters": ["error-log", "warn-log"],
            "logEvents": [
                {"id": "1", "timestamp": 1683213799433i64, "message": "boom"}
            ]
        });

        let envelope: LogEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.message_type, MessageType::DataMessage);
        assert_eq!(envelope.filter_names(), "error-log, warn-log");
        assert_eq!(envelope.first_event().unwrap().timestamp, 1683213799433);
        assert!(!envelope.is_control());
    }

    #[test]
    fn test_unknown_message_type() {
        let parsed: MessageType = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(parsed, MessageType::Unknown);
        let control: MessageType = serde_json::from_str("\"CONTROL_MESSAGE\"").unwrap();
        assert_eq!(control, MessageType::ControlMessage);
    }
}
