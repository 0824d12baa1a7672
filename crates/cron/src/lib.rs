//! 定时任务CRON表达式的客户端预览
//!
//! 解析调度表达式、推算未来的执行时间并生成可读描述，全部为纯计算，不依赖服务端。

pub mod describe;
pub mod error;
pub mod expression;
pub mod matcher;
pub mod preview;
pub mod schedule;

pub use describe::{describe, describe_expression, CUSTOM_DESCRIPTION, INVALID_DESCRIPTION};
pub use error::CronError;
pub use expression::{CronExpression, CronField};
pub use matcher::{match_field, match_weekday};
pub use preview::{preview, SchedulePreview};
pub use schedule::{next_executions, SEARCH_LIMIT_MINUTES};
