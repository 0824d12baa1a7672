use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{StepEndData, StepStartData, StepStatus};

/// 单个执行步骤的当前状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub step_id: Option<i64>,
    /// 步骤的身份与排序键
    pub step_order: u32,
    pub step_name: String,
    pub status: StepStatus,
    pub output: String,
    pub error: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
}

impl StepRecord {
    /// 根据 `step_start` 创建处于运行中的记录
    pub fn started(data: &StepStartData) -> Self {
        Self {
            step_id: data.step_id,
            step_order: data.step_order,
            step_name: data.step_name.clone(),
            status: StepStatus::Running,
            output: String::new(),
            error: None,
            start_time: data.timestamp,
            end_time: None,
            duration_ms: None,
        }
    }

    /// 追加输出，多段之间以换行连接
    pub fn append_output(&mut self, chunk: &str) {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        self.output.push_str(chunk);
    }

    pub(crate) fn finish(&mut self, data: &StepEndData) {
        self.status = data.status;
        self.error = data.error.clone();
        self.end_time = data.timestamp;
        self.duration_ms = data.duration_ms;
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
