use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// 步骤状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl StepStatus {
    /// 成功或失败都是终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Failed => "failed",
        }
    }
}

/// 执行日志通道推送的事件
///
/// 线上格式为带 `type` 标签的JSON对象，字段使用camelCase，时间戳为毫秒。
/// 无法识别的 `type` 解析为 [`StepEvent::Unknown`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepEvent {
    /// 保活，不改变任何状态
    Heartbeat,
    StepStart(StepStartData),
    StepLog(StepLogData),
    StepEnd(StepEndData),
    /// 整个执行结束
    Complete,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStartData {
    pub step_order: u32,
    #[serde(default)]
    pub step_id: Option<i64>,
    #[serde(default)]
    pub step_name: String,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepLogData {
    pub step_order: u32,
    #[serde(default)]
    pub output: String,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEndData {
    pub step_order: u32,
    pub status: StepStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl StepEvent {
    /// 事件类型名称
    pub fn kind(&self) -> &'static str {
        match self {
            StepEvent::Heartbeat => "heartbeat",
            StepEvent::StepStart(_) => "step_start",
            StepEvent::StepLog(_) => "step_log",
            StepEvent::StepEnd(_) => "step_end",
            StepEvent::Complete => "complete",
            StepEvent::Unknown => "unknown",
        }
    }

    /// 事件所属步骤的序号
    pub fn step_order(&self) -> Option<u32> {
        match self {
            StepEvent::StepStart(data) => Some(data.step_order),
            StepEvent::StepLog(data) => Some(data.step_order),
            StepEvent::StepEnd(data) => Some(data.step_order),
            StepEvent::Heartbeat | StepEvent::Complete | StepEvent::Unknown => None,
        }
    }

    /// 解析带 `type` 字段的JSON事件
    pub fn from_json(data: &str) -> Result<Self, ChannelError> {
        Ok(serde_json::from_str(data)?)
    }

    /// 解析一个SSE帧
    ///
    /// 事件类型可以放在 `event:` 行，也可以放在JSON的 `type` 字段；两者都有时以JSON为准。
    /// 没有数据的帧按事件名处理，空事件名视为心跳。
    pub fn from_sse(event_name: &str, data: &str) -> Result<Self, ChannelError> {
        let name = match event_name.trim() {
            "message" => "",
            other => other,
        };
        let data = data.trim();

        if data.is_empty() {
            return Ok(match name {
                "" | "heartbeat" => StepEvent::Heartbeat,
                "complete" => StepEvent::Complete,
                _ => StepEvent::Unknown,
            });
        }

        let mut value: serde_json::Value = serde_json::from_str(data)?;
        if let Some(object) = value.as_object_mut() {
            if !object.contains_key("type") && !name.is_empty() {
                object.insert("type".to_string(), serde_json::Value::from(name));
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}
