//! Slack Log Notifier - 把 CloudWatch Logs 订阅推送转发为 Slack 线程通知
//!
//! 一次调用处理一个 awslogs 信封：先发一条根消息（过滤器名称 + 控制台链接），
//! 再把每条日志依次挂到这条消息的线程下。

pub mod cli;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod infra;
pub mod notification;

pub use config::NotifierConfig;
pub use envelope::{decode_trigger, LogEnvelope, LogEvent, MessageType};
pub use error::NotifierError;
pub use handler::{handle_trigger, InvocationFailure, InvocationReport, InvocationState, Notifier};
pub use infra::{LocalSecretStore, SecretStore, Secrets};
pub use notification::{
    DeliveryResponse, HttpTransport, LocalTransport, MessageFormatter, MessageTransport,
    NotificationDocument, RawResponse, SlackClient,
};
