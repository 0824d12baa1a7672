//! 定时任务执行日志的实时重建
//!
//! 订阅某个执行日志ID的步骤事件流，把乱序、可能不完整的事件折叠成按步骤序号排列的视图，
//! 并维护连接与完成状态。传输方式由 [`EventChannel`] 实现提供。

pub mod channel;
pub mod error;
pub mod events;
pub mod memory;
pub mod monitor;
pub mod record;
pub mod session;
pub mod sse;

/// 执行日志ID
pub type JobLogId = i64;

pub use channel::{ChannelSignal, ConnectionState, EventChannel, EventSubscription};
pub use error::ChannelError;
pub use events::{StepEndData, StepEvent, StepLogData, StepStartData, StepStatus};
pub use memory::{InMemoryChannel, InMemoryPublisher};
pub use monitor::{ExecutionMonitor, MonitorView};
pub use record::StepRecord;
pub use session::{FoldOutcome, StepSummary, StreamSession};
pub use sse::SseChannel;
