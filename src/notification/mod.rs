//! 通知层 - 构建 Slack 通知文档并发送
//!
//! # 流程
//! 1. `MessageFormatter` 把信封转换为 `NotificationDocument`（清理 ANSI、截断）
//! 2. `SlackClient` 通过 `MessageTransport` 发送文档
//! 3. `SlackClient::acknowledge` 检查响应，得到线程 ts 或触发失败通知
//!
//! # 使用示例
//! ```ignore
//! use slack_log_notifier::notification::{LocalTransport, MessageFormatter, SlackClient};
//!
//! let transport = LocalTransport::new();
//! let client = SlackClient::new(&transport, url, token, "C0123456");
//! let root = MessageFormatter::new().root_document(&envelope, &console_url);
//! let response = client.send(&root, None)?;
//! let thread_ts = client.acknowledge(&response, || formatter.fallback_document(ts))?;
//! ```

pub mod blocks;
pub mod formatter;
pub mod sanitize;
pub mod slack;
pub mod transport;

pub use blocks::{Block, NotificationDocument};
pub use formatter::{msg, MessageFormatter};
pub use sanitize::{root_description, strip_ansi, truncate_message};
pub use slack::{DeliveryResponse, PostMessageRequest, SlackClient};
pub use transport::{HttpTransport, LocalTransport, MessageTransport, RawResponse};
