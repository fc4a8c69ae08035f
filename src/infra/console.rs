//! CloudWatch 控制台链接生成

use chrono::Utc;

/// 默认 AWS 区域
pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// 生成指定日志流的 CloudWatch 控制台链接
///
/// 指定 `window_ms` 时，链接会以 `timestamp_ms`（缺省为当前时间）为中心，
/// 只显示前后 `window_ms` 毫秒内的日志。
pub fn build_log_console_url(
    region: &str,
    log_group: &str,
    log_stream: &str,
    timestamp_ms: Option<i64>,
    window_ms: Option<i64>,
) -> String {
    let time_query = match window_ms {
        Some(window) => {
            let center = timestamp_ms.unwrap_or_else(|| Utc::now().timestamp_millis());
            format!(
                "$3Fend$3D{}$26filterPattern$3D$26start$3D{}",
                center.saturating_add(window),
                center.saturating_sub(window)
            )
        }
        None => String::new(),
    };

    format!(
        "https://{region}.console.aws.amazon.com/cloudwatch/home?region={region}#logsV2:log-groups/log-group/{}/log-events/{}{}",
        urlencoding::encode(log_group),
        urlencoding::encode(log_stream),
        time_query,
    )
}
