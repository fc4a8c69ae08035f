//! awslogs 信封 - 解码 CloudWatch Logs 订阅过滤器推送的数据
//!
//! 触发事件格式：`{"awslogs": {"data": base64(gzip(JSON))}}`

pub mod decoder;
pub mod types;

pub use decoder::{
    decode_payload, decode_trigger, encode_envelope, missing_keys, validate_envelope,
    EVENT_KEYS, TOP_LEVEL_KEYS,
};
pub use types::{LogEnvelope, LogEvent, MessageType};
