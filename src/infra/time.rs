//! 时间戳显示 - 固定转换为日本时间 (UTC+9)

use chrono::{DateTime, FixedOffset};

/// UTC+9 的秒数偏移
pub const JST_OFFSET_SECS: i32 = 9 * 3600;

/// 毫秒时间戳 → `2023-05-05T00:23:19.433+09:00`
///
/// 超出 chrono 可表示范围的时间戳原样输出毫秒数。
pub fn to_local_display(timestamp_ms: i64) -> String {
    let (Some(offset), Some(utc)) = (
        FixedOffset::east_opt(JST_OFFSET_SECS),
        DateTime::from_timestamp_millis(timestamp_ms),
    ) else {
        return timestamp_ms.to_string();
    };

    utc.with_timezone(&offset)
        .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        .to_string()
}
