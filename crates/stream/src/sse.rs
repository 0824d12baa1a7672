//! 基于SSE的执行日志通道
//!
//! 服务端返回成功状态即视为订阅确认；之后的每个SSE帧解析为一个 [`StepEvent`]。

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use scheduler_core::ApiConfig;

use crate::channel::{ChannelSignal, EventChannel, EventSubscription};
use crate::error::ChannelError;
use crate::events::StepEvent;
use crate::JobLogId;

type SseEventStream =
    Pin<Box<dyn Stream<Item = Result<Event, EventStreamError<reqwest::Error>>> + Send>>;

/// 通过HTTP SSE订阅执行日志
#[derive(Debug, Clone)]
pub struct SseChannel {
    client: reqwest::Client,
    api: ApiConfig,
}

impl SseChannel {
    pub fn new(api: ApiConfig) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(api.connect_timeout_seconds))
            .build()
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        Ok(Self { client, api })
    }

    pub fn stream_url(&self, job_log_id: JobLogId) -> String {
        self.api.stream_url(job_log_id)
    }
}

#[async_trait]
impl EventChannel for SseChannel {
    async fn subscribe(
        &self,
        job_log_id: JobLogId,
    ) -> Result<Box<dyn EventSubscription>, ChannelError> {
        let url = self.stream_url(job_log_id);
        debug!(job_log_id, url = %url, "建立SSE连接");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "text/event-stream")
            .header("Cache-Control", "no-cache");
        if let Some(token) = &self.api.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Http {
                status: response.status().as_u16(),
            });
        }

        info!(job_log_id, "SSE连接已建立");

        Ok(Box::new(SseSubscription {
            job_log_id,
            acknowledged: false,
            stream: Some(Box::pin(response.bytes_stream().eventsource())),
        }))
    }
}

struct SseSubscription {
    job_log_id: JobLogId,
    acknowledged: bool,
    stream: Option<SseEventStream>,
}

#[async_trait]
impl EventSubscription for SseSubscription {
    async fn next_signal(&mut self) -> Option<Result<ChannelSignal, ChannelError>> {
        let stream = self.stream.as_mut()?;

        if !self.acknowledged {
            self.acknowledged = true;
            return Some(Ok(ChannelSignal::Opened));
        }

        loop {
            match stream.next().await? {
                Ok(event) => match StepEvent::from_sse(&event.event, &event.data) {
                    Ok(step_event) => return Some(Ok(ChannelSignal::Event(step_event))),
                    Err(e) => {
                        // 单个坏帧不影响后续事件
                        warn!(
                            job_log_id = self.job_log_id,
                            data = %event.data,
                            error = %e,
                            "解析SSE事件失败"
                        );
                    }
                },
                Err(e) => return Some(Err(ChannelError::Stream(e.to_string()))),
            }
        }
    }

    fn cancel(&mut self) {
        if self.stream.take().is_some() {
            debug!(job_log_id = self.job_log_id, "SSE订阅已取消");
        }
    }
}
