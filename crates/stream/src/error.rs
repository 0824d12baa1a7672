use thiserror::Error;

use scheduler_core::SchedulerError;

/// 执行日志通道错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("建立连接失败: {0}")]
    Connect(String),

    #[error("服务端返回错误状态: {status}")]
    Http { status: u16 },

    #[error("事件流错误: {0}")]
    Stream(String),

    #[error("事件解析失败: {0}")]
    Decode(String),

    #[error("连接已断开")]
    Disconnected,
}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        ChannelError::Decode(err.to_string())
    }
}

impl From<ChannelError> for SchedulerError {
    fn from(err: ChannelError) -> Self {
        SchedulerError::Channel(err.to_string())
    }
}
