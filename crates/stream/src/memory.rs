use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::channel::{ChannelSignal, EventChannel, EventSubscription};
use crate::error::ChannelError;
use crate::events::StepEvent;
use crate::JobLogId;

type SignalSender = mpsc::UnboundedSender<Result<ChannelSignal, ChannelError>>;
type SignalReceiver = mpsc::UnboundedReceiver<Result<ChannelSignal, ChannelError>>;

#[derive(Debug, Default)]
struct ChannelState {
    /// 执行日志ID -> 订阅者发送端
    subscribers: HashMap<JobLogId, Vec<SignalSender>>,
    /// 下一次订阅直接失败
    reject_next: Option<ChannelError>,
}

/// 内存事件通道
///
/// 使用 Tokio channels 在进程内投递事件，适用于嵌入式场景和测试。
#[derive(Debug, Clone)]
pub struct InMemoryChannel {
    state: Arc<Mutex<ChannelState>>,
    /// 订阅后是否立即确认
    auto_ack: bool,
}

impl Default for InMemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChannelState::default())),
            auto_ack: true,
        }
    }

    /// 订阅后不自动确认，由 [`InMemoryPublisher::acknowledge`] 手动确认
    pub fn without_auto_ack() -> Self {
        Self {
            auto_ack: false,
            ..Self::new()
        }
    }

    /// 获取指定执行日志的发布端
    pub fn publisher(&self, job_log_id: JobLogId) -> InMemoryPublisher {
        InMemoryPublisher {
            state: Arc::clone(&self.state),
            job_log_id,
        }
    }

    /// 让下一次订阅失败
    pub async fn reject_next_subscribe(&self, error: ChannelError) {
        self.state.lock().await.reject_next = Some(error);
    }
}

#[async_trait]
impl EventChannel for InMemoryChannel {
    async fn subscribe(
        &self,
        job_log_id: JobLogId,
    ) -> Result<Box<dyn EventSubscription>, ChannelError> {
        let mut state = self.state.lock().await;
        if let Some(error) = state.reject_next.take() {
            return Err(error);
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        if self.auto_ack {
            // 接收端刚创建，发送不会失败
            let _ = sender.send(Ok(ChannelSignal::Opened));
        }
        state.subscribers.entry(job_log_id).or_default().push(sender);
        debug!(job_log_id, "内存通道新增订阅");

        Ok(Box::new(InMemorySubscription { receiver }))
    }
}

struct InMemorySubscription {
    receiver: SignalReceiver,
}

#[async_trait]
impl EventSubscription for InMemorySubscription {
    async fn next_signal(&mut self) -> Option<Result<ChannelSignal, ChannelError>> {
        self.receiver.recv().await
    }

    fn cancel(&mut self) {
        self.receiver.close();
        // 丢弃已经排队但尚未处理的信号
        while self.receiver.try_recv().is_ok() {}
    }
}

/// 向某个执行日志的所有订阅者发布信号
#[derive(Debug, Clone)]
pub struct InMemoryPublisher {
    state: Arc<Mutex<ChannelState>>,
    job_log_id: JobLogId,
}

impl InMemoryPublisher {
    pub async fn publish(&self, event: StepEvent) -> usize {
        self.broadcast(Ok(ChannelSignal::Event(event))).await
    }

    pub async fn acknowledge(&self) -> usize {
        self.broadcast(Ok(ChannelSignal::Opened)).await
    }

    /// 向订阅者报告通道错误
    pub async fn fail(&self, error: ChannelError) -> usize {
        self.broadcast(Err(error)).await
    }

    /// 断开全部订阅者（事件流结束）
    pub async fn disconnect(&self) {
        let mut state = self.state.lock().await;
        if let Some(senders) = state.subscribers.remove(&self.job_log_id) {
            info!(
                job_log_id = self.job_log_id,
                subscribers = senders.len(),
                "内存通道断开订阅者"
            );
        }
    }

    /// 仍然存活的订阅者数量
    pub async fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock().await;
        match state.subscribers.get_mut(&self.job_log_id) {
            Some(senders) => {
                senders.retain(|sender| !sender.is_closed());
                senders.len()
            }
            None => 0,
        }
    }

    async fn broadcast(&self, signal: Result<ChannelSignal, ChannelError>) -> usize {
        let mut state = self.state.lock().await;
        let Some(senders) = state.subscribers.get_mut(&self.job_log_id) else {
            return 0;
        };
        senders.retain(|sender| sender.send(signal.clone()).is_ok());
        senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_receives_ack_then_events() {
        let channel = InMemoryChannel::new();
        let publisher = channel.publisher(7);
        let mut subscription = channel.subscribe(7).await.unwrap();

        assert_eq!(publisher.publish(StepEvent::Heartbeat).await, 1);
        assert_eq!(
            subscription.next_signal().await,
            Some(Ok(ChannelSignal::Opened))
        );
        assert_eq!(
            subscription.next_signal().await,
            Some(Ok(ChannelSignal::Event(StepEvent::Heartbeat)))
        );
    }

    #[tokio::test]
    async fn test_events_are_scoped_by_job_log_id() {
        let channel = InMemoryChannel::new();
        let _subscription = channel.subscribe(1).await.unwrap();

        assert_eq!(channel.publisher(2).publish(StepEvent::Complete).await, 0);
        assert_eq!(channel.publisher(1).subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn test_cancel_drops_queued_signals() {
        let channel = InMemoryChannel::new();
        let publisher = channel.publisher(1);
        let mut subscription = channel.subscribe(1).await.unwrap();
        publisher.publish(StepEvent::Heartbeat).await;

        subscription.cancel();
        assert_eq!(subscription.next_signal().await, None);
        assert_eq!(publisher.subscriber_count().await, 0);
        assert_eq!(publisher.publish(StepEvent::Heartbeat).await, 0);
    }

    #[tokio::test]
    async fn test_reject_next_subscribe() {
        let channel = InMemoryChannel::new();
        channel
            .reject_next_subscribe(ChannelError::Http { status: 503 })
            .await;
        assert!(channel.subscribe(1).await.is_err());
        assert!(channel.subscribe(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_disconnect_ends_stream() {
        let channel = InMemoryChannel::without_auto_ack();
        let publisher = channel.publisher(3);
        let mut subscription = channel.subscribe(3).await.unwrap();
        publisher.disconnect().await;
        assert_eq!(subscription.next_signal().await, None);
    }
}
