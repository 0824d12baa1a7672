use chrono::{DateTime, TimeZone};

use crate::describe::describe_expression;
use crate::error::CronError;
use crate::expression::{CronExpression, CronField};
use crate::schedule::next_executions;

/// 调度预览：描述加上即将到来的执行时间
#[derive(Debug, Clone)]
pub struct SchedulePreview<Tz: TimeZone> {
    pub expression: CronExpression,
    pub description: String,
    pub next_runs: Vec<DateTime<Tz>>,
    pub requested: usize,
    /// 使用了不会被求值的 `a/n` 步长的字段
    pub unsupported_fields: Vec<CronField>,
}

impl<Tz: TimeZone> SchedulePreview<Tz> {
    /// 搜索范围内没有找到请求数量的执行时间
    pub fn is_exhausted(&self) -> bool {
        self.next_runs.len() < self.requested
    }
}

/// 生成调度预览，相同输入总是得到相同结果
pub fn preview<Tz: TimeZone>(
    raw: &str,
    from: &DateTime<Tz>,
    count: usize,
) -> Result<SchedulePreview<Tz>, CronError> {
    let expression = CronExpression::parse(raw)?;
    let description = describe_expression(&expression);
    let next_runs = next_executions(&expression, from, count);
    let unsupported_fields = expression.restricted_steps();

    Ok(SchedulePreview {
        expression,
        description,
        next_runs,
        requested: count,
        unsupported_fields,
    })
}
