//! 信封解码与校验
//!
//! 解码步骤：base64 → gzip 解压 → UTF-8 JSON → 必需字段校验 → 类型化。
//! 校验会收集所有缺失字段的路径（如 `data.logEvents[2].message`），而不是遇到第一个就返回。

use std::io::{Read, Write};

use base64::{engine::general_purpose, Engine as _};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use tracing::debug;

use super::types::LogEnvelope;
use crate::error::NotifierError;

/// 信封顶层必需字段
pub const TOP_LEVEL_KEYS: [&str; 6] = [
    "messageType",
    "owner",
    "logGroup",
    "logStream",
    "subscriptionFilters",
    "logEvents",
];

/// logEvents 中每一项的必需字段
pub const EVENT_KEYS: [&str; 3] = ["id", "timestamp", "message"];

/// 触发事件中压缩数据所在路径
const DATA_PATH: &str = "awslogs.data";

/// 解码并校验触发事件，得到类型化信封
pub fn decode_trigger(event: &Value) -> Result<LogEnvelope, NotifierError> {
    let data = decode_payload(event)?;
    validate_envelope(data)
}

/// 从触发事件中取出 `awslogs.data` 并解码为 JSON
pub fn decode_payload(event: &Value) -> Result<Value, NotifierError> {
    let encoded = event
        .get("awslogs")
        .and_then(|awslogs| awslogs.get("data"))
        .ok_or_else(|| NotifierError::MalformedEnvelope {
            missing: vec![DATA_PATH.to_string()],
        })?;

    let encoded = encoded.as_str().ok_or_else(|| {
        NotifierError::InvalidPayload(format!("{} must be a string", DATA_PATH))
    })?;

    let compressed = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| NotifierError::InvalidPayload(format!("base64 decode failed: {}", e)))?;

    let mut decompressed = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut decompressed)
        .map_err(|e| NotifierError::InvalidPayload(format!("gzip decompress failed: {}", e)))?;

    debug!(
        compressed_len = compressed.len(),
        decompressed_len = decompressed.len(),
        "Decoded awslogs payload"
    );

    serde_json::from_slice(&decompressed)
        .map_err(|e| NotifierError::InvalidPayload(format!("JSON parse failed: {}", e)))
}

/// 校验必需字段并转换为类型化信封
pub fn validate_envelope(data: Value) -> Result<LogEnvelope, NotifierError> {
    let missing = missing_keys(&data);
    if !missing.is_empty() {
        return Err(NotifierError::MalformedEnvelope { missing });
    }

    let is_empty = data
        .get("logEvents")
        .and_then(Value::as_array)
        .map(|events| events.is_empty())
        .unwrap_or(false);
    if is_empty {
        return Err(NotifierError::EmptyLogEvents);
    }

    serde_json::from_value(data)
        .map_err(|e| NotifierError::InvalidPayload(format!("unexpected envelope shape: {}", e)))
}

/// 返回所有缺失字段的路径
pub fn missing_keys(data: &Value) -> Vec<String> {
    let mut missing = Vec::new();

    for key in TOP_LEVEL_KEYS {
        if data.get(key).is_none() {
            missing.push(format!("data.{}", key));
        }
    }

    if let Some(events) = data.get("logEvents").and_then(Value::as_array) {
        for (index, event) in events.iter().enumerate() {
            for key in EVENT_KEYS {
                if event.get(key).is_none() {
                    missing.push(format!("data.logEvents[{}].{}", index, key));
                }
            }
        }
    }

    missing
}

/// 将信封编码为触发事件（gzip + base64），用于本地测试
pub fn encode_envelope(data: &Value) -> Result<Value, NotifierError> {
    let json = serde_json::to_vec(data)
        .map_err(|e| NotifierError::InvalidPayload(format!("JSON serialize failed: {}", e)))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| NotifierError::InvalidPayload(format!("gzip compress failed: {}", e)))?;
    let compressed = encoder
        .finish()
        .map_err(|e| NotifierError::InvalidPayload(format!("gzip compress failed: {}", e)))?;

    Ok(serde_json::json!({
        "awslogs": {
            "data": general_purpose::STANDARD.encode(compressed)
        }
    }))
}
