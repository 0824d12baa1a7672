use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::events::StepEvent;
use crate::JobLogId;

/// 订阅的连接状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        }
    }
}

/// 订阅上收到的信号
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelSignal {
    /// 服务端确认订阅
    Opened,
    Event(StepEvent),
}

/// 一个已建立的订阅
#[async_trait]
pub trait EventSubscription: Send {
    /// 等待下一个信号，`None` 表示事件流已结束
    async fn next_signal(&mut self) -> Option<Result<ChannelSignal, ChannelError>>;

    /// 同步取消订阅，之后 `next_signal` 只会返回 `None`
    fn cancel(&mut self);
}

/// 执行日志事件的传输方式
#[async_trait]
pub trait EventChannel: Send + Sync {
    async fn subscribe(
        &self,
        job_log_id: JobLogId,
    ) -> Result<Box<dyn EventSubscription>, ChannelError>;
}
