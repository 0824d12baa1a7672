use thiserror::Error;

use scheduler_core::SchedulerError;

/// CRON表达式解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("字段数量错误: 需要5个字段或以0开头的6个字段，实际为{count}个 ({expr})")]
    FieldCount { expr: String, count: usize },
}

impl CronError {
    /// 校验失败的类别
    pub fn kind(&self) -> &'static str {
        match self {
            CronError::FieldCount { .. } => "field-count",
        }
    }
}

impl From<CronError> for SchedulerError {
    fn from(err: CronError) -> Self {
        let message = err.to_string();
        match err {
            CronError::FieldCount { expr, .. } => SchedulerError::InvalidCron { expr, message },
        }
    }
}
