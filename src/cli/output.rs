//! CLI 输入输出

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// 输出格式化的 JSON
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// 从文件读取 JSON，未指定文件时从 stdin 读取
pub fn read_json_input(file: Option<&Path>) -> Result<serde_json::Value> {
    let content = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    serde_json::from_str(&content).context("Input is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_json_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("event.json");
        fs::write(&path, r#"{"awslogs": {"data": "abc"}}"#).unwrap();

        let value = read_json_input(Some(&path)).unwrap();
        assert_eq!(value["awslogs"]["data"], "abc");
    }

    #[test]
    fn test_read_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("event.json");
        fs::write(&path, "not json").unwrap();
        assert!(read_json_input(Some(&path)).is_err());
    }

    #[test]
    fn test_format_json() {
        let text = format_json(&serde_json::json!({"ok": true}));
        assert!(text.contains("\"ok\": true"));
    }
}
