//! 日志内容清理 - 移除 ANSI 转义序列并截断到 Slack 的长度限制
//!
//! 长度均按字符（Unicode scalar value）计算，不按字节，日志中常有日文等多字节字符。

use regex::Regex;
use std::sync::LazyLock;

/// Slack 单个文本块的日志内容上限（字符数）
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// 截断标记
pub const TRUNCATION_MARKER: &str = "...";

/// 根消息摘要跳过的前缀长度（日志行开头的时间戳等）
pub const DESCRIPTION_SKIP_CHARS: usize = 26;

/// 根消息摘要最多显示的字符数
pub const DESCRIPTION_MAX_CHARS: usize = 80;

/// ANSI 颜色/样式转义序列：ESC [ 数字 m
static ANSI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[\d+m").expect("valid ANSI pattern"));

/// 移除 ANSI 颜色转义序列
///
/// 重复替换直到不再匹配，移除后拼接出的新序列（如 `ESC[1ESC[2mm`）也会被清掉。
pub fn strip_ansi(message: &str) -> String {
    let mut cleaned = ANSI_PATTERN.replace_all(message, "").into_owned();
    while ANSI_PATTERN.is_match(&cleaned) {
        cleaned = ANSI_PATTERN.replace_all(&cleaned, "").into_owned();
    }
    cleaned
}

/// 超过 `max_chars` 时截断并追加 `...`
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &message[..byte_idx], TRUNCATION_MARKER),
        None => message.to_string(),
    }
}

/// 根消息摘要：清理后的第一条日志第 [26, 106) 个字符
///
/// 日志不足 26 个字符时返回空字符串。
pub fn root_description(first_message: &str) -> String {
    strip_ansi(first_message)
        .chars()
        .skip(DESCRIPTION_SKIP_CHARS)
        .take(DESCRIPTION_MAX_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        let raw = "\x1b[31m[ERROR]\x1b[0m failed \x1b[1mhere\x1b[22m";
        assert_eq!(strip_ansi(raw), "[ERROR] failed here");
    }

    #[test]
    fn test_strip_ansi_is_idempotent() {
        let samples = [
            "\x1b[31mred\x1b[0m",
            "\x1b[\x1b[1mm nested",
            "plain",
            "\x1b[38;5;1m multi-param stays",
            "\x1b[1\x1b[2mm spliced",
        ];
        for sample in samples {
            let once = strip_ansi(sample);
            assert_eq!(strip_ansi(&once), once, "sample: {:?}", sample);
        }
    }

    #[test]
    fn test_strip_ansi_spliced_sequence() {
        assert_eq!(strip_ansi("\x1b[1\x1b[2mm spliced"), " spliced");
    }

    #[test]
    fn test_strip_ansi_keeps_other_sequences() {
        // 只处理 ESC [ 数字 m 的形式
        assert_eq!(strip_ansi("\x1b[2J clear"), "\x1b[2J clear");
    }

    #[test]
    fn test_truncate_message() {
        let long = "a".repeat(1050);
        let truncated = truncate_message(&long, MAX_MESSAGE_CHARS);
        assert_eq!(truncated.chars().count(), 1003);
        assert!(truncated.ends_with("..."));
        assert_eq!(&truncated[..1000], &long[..1000]);

        let exact = "b".repeat(1000);
        assert_eq!(truncate_message(&exact, MAX_MESSAGE_CHARS), exact);
        assert_eq!(truncate_message("short", MAX_MESSAGE_CHARS), "short");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let japanese = "エ".repeat(1001);
        let truncated = truncate_message(&japanese, MAX_MESSAGE_CHARS);
        assert_eq!(truncated.chars().count(), 1003);
        assert!(truncated.starts_with(&"エ".repeat(1000)));
    }

    #[test]
    fn test_root_description_window() {
        let prefix = "2023-05-06T01:55:50.034Z\t\t";
        assert_eq!(prefix.chars().count(), 26);
        let body = "x".repeat(100);
        let description = root_description(&format!("{}{}", prefix, body));
        assert_eq!(description, "x".repeat(80));
    }

    #[test]
    fn test_root_description_short_messages() {
        assert_eq!(root_description("short"), "");
        assert_eq!(root_description(&"y".repeat(30)), "yyyy");
    }

    #[test]
    fn test_root_description_strips_ansi_first() {
        let message = format!("\x1b[31m{}\x1b[0mtail", "p".repeat(26));
        assert_eq!(root_description(&message), "tail");
    }
}
