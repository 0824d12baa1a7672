use serde::Serialize;
use tracing::{debug, info, warn};

use crate::channel::{ChannelSignal, ConnectionState, EventChannel, EventSubscription};
use crate::error::ChannelError;
use crate::events::StepEvent;
use crate::record::StepRecord;
use crate::session::{FoldOutcome, StepSummary, StreamSession};
use crate::JobLogId;

pub type CompletionCallback = Box<dyn FnMut(&StreamSession) + Send>;
pub type ErrorCallback = Box<dyn FnMut(&ChannelError) + Send>;

/// 供展示层使用的只读快照
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorView {
    pub job_log_id: Option<JobLogId>,
    pub connection_state: ConnectionState,
    pub is_complete: bool,
    pub summary: StepSummary,
    pub steps: Vec<StepRecord>,
}

/// 单个执行日志的实时监控
///
/// 同一时间最多持有一个订阅。`close` 是同步的，返回后不会再有事件被折叠；
/// 通道出错后不会自动重连，需要显式调用 [`ExecutionMonitor::reconnect`]。
pub struct ExecutionMonitor<C: EventChannel> {
    channel: C,
    job_log_id: Option<JobLogId>,
    state: ConnectionState,
    session: StreamSession,
    subscription: Option<Box<dyn EventSubscription>>,
    on_complete: Option<CompletionCallback>,
    on_error: Option<ErrorCallback>,
}

impl<C: EventChannel> ExecutionMonitor<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            job_log_id: None,
            state: ConnectionState::Idle,
            session: StreamSession::new(),
            subscription: None,
            on_complete: None,
            on_error: None,
        }
    }

    /// 收到 `complete` 事件时回调
    pub fn on_complete(mut self, callback: impl FnMut(&StreamSession) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// 通道出错或断开时回调
    pub fn on_error(mut self, callback: impl FnMut(&ChannelError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// 开始监控指定的执行日志
    ///
    /// 执行日志ID变化时关闭旧订阅并丢弃已有步骤；同一ID已打开过时什么也不做，
    /// 关闭后只能通过 [`ExecutionMonitor::reconnect`] 重新订阅。
    pub async fn open(&mut self, job_log_id: JobLogId) {
        if self.job_log_id == Some(job_log_id) {
            debug!(job_log_id, state = self.state.as_str(), "会话已存在，忽略");
            return;
        }

        if let Some(previous) = self.job_log_id {
            info!(from = previous, to = job_log_id, "执行日志ID变化，重建会话");
        }
        self.close();
        self.session = StreamSession::new();
        self.job_log_id = Some(job_log_id);
        self.connect(job_log_id).await;
    }

    /// 等待并处理一个通道信号，返回订阅是否仍然存活
    pub async fn pump(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };

        let signal = subscription.next_signal().await;
        match signal {
            Some(Ok(ChannelSignal::Opened)) => {
                self.mark_open();
                true
            }
            Some(Ok(ChannelSignal::Event(event))) => {
                // 确认前到达的事件同样视为连接已建立
                self.mark_open();
                self.on_event(&event);
                self.subscription.is_some()
            }
            Some(Err(err)) => {
                self.fail(err);
                false
            }
            None => {
                self.fail(ChannelError::Disconnected);
                false
            }
        }
    }

    /// 持续处理信号直到订阅关闭
    pub async fn run(&mut self) {
        while self.pump().await {}
    }

    /// 折叠一个事件；`complete` 总会关闭订阅，只有首次完成才触发回调
    pub fn on_event(&mut self, event: &StepEvent) -> FoldOutcome {
        let outcome = self.session.fold(event);
        if outcome == FoldOutcome::Completed {
            info!(
                job_log_id = ?self.job_log_id,
                steps = self.session.len(),
                "任务执行完成"
            );
            if let Some(callback) = self.on_complete.as_mut() {
                callback(&self.session);
            }
        }
        if matches!(event, StepEvent::Complete) {
            self.close();
        }
        outcome
    }

    /// 取消当前订阅，可重复调用
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
            info!(job_log_id = ?self.job_log_id, "订阅已关闭");
        }
        self.state = ConnectionState::Closed;
    }

    /// 关闭后重新订阅同一执行日志，已有步骤保留
    pub async fn reconnect(&mut self) {
        let Some(job_log_id) = self.job_log_id else {
            warn!("尚未指定执行日志，无法重连");
            return;
        };
        info!(job_log_id, "重新连接执行日志");
        self.close();
        self.connect(job_log_id).await;
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    pub fn job_log_id(&self) -> Option<JobLogId> {
        self.job_log_id
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    pub fn view(&self) -> MonitorView {
        MonitorView {
            job_log_id: self.job_log_id,
            connection_state: self.state,
            is_complete: self.session.is_complete(),
            summary: self.session.summary(),
            steps: self.session.steps().cloned().collect(),
        }
    }

    async fn connect(&mut self, job_log_id: JobLogId) {
        self.state = ConnectionState::Connecting;
        match self.channel.subscribe(job_log_id).await {
            Ok(subscription) => {
                debug!(job_log_id, "订阅已发起，等待确认");
                self.subscription = Some(subscription);
            }
            Err(err) => self.fail(err),
        }
    }

    fn mark_open(&mut self) {
        if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Open;
            info!(job_log_id = ?self.job_log_id, "执行日志订阅已确认");
        }
    }

    fn fail(&mut self, err: ChannelError) {
        warn!(job_log_id = ?self.job_log_id, error = %err, "执行日志通道异常");
        self.close();
        if let Some(callback) = self.on_error.as_mut() {
            callback(&err);
        }
    }
}

impl<C: EventChannel> Drop for ExecutionMonitor<C> {
    fn drop(&mut self) {
        self.close();
    }
}
