//! 基础设施层 - 密钥读取、控制台链接、时区转换

pub mod console;
pub mod secrets;
pub mod time;

pub use console::{build_log_console_url, DEFAULT_REGION};
pub use secrets::{LocalSecretStore, SecretStore, Secrets};
pub use time::{to_local_display, JST_OFFSET_SECS};
