//! 终端输出

use std::fmt::Write;

use chrono::{DateTime, Local};
use serde_json::{json, Value};

use scheduler_cron::SchedulePreview;
use scheduler_stream::{MonitorView, StepStatus};

pub fn preview_text(preview: &SchedulePreview<Local>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "表达式: {}", preview.expression);
    let _ = writeln!(out, "描述: {}", preview.description);

    if preview.next_runs.is_empty() {
        let _ = writeln!(out, "近30天内没有可见的执行时间");
        return out;
    }

    let _ = writeln!(out, "即将到来的执行时间:");
    for (i, time) in preview.next_runs.iter().enumerate() {
        let _ = writeln!(out, "  第{}次: {}", i + 1, format_time(time));
    }
    if preview.is_exhausted() {
        let _ = writeln!(
            out,
            "  （近30天内仅找到{}次，少于请求的{}次）",
            preview.next_runs.len(),
            preview.requested
        );
    }
    out
}

pub fn preview_json(preview: &SchedulePreview<Local>) -> Value {
    json!({
        "expression": preview.expression.to_string(),
        "description": preview.description,
        "nextRuns": preview
            .next_runs
            .iter()
            .map(|t| t.to_rfc3339())
            .collect::<Vec<_>>(),
        "exhausted": preview.is_exhausted(),
        "unsupportedFields": preview
            .unsupported_fields
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>(),
    })
}

pub fn view_text(view: &MonitorView) -> String {
    let mut out = String::new();
    let id = view
        .job_log_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(
        out,
        "[{}] 执行日志 {} | 共{}步 运行中{} 成功{} 失败{}{}",
        view.connection_state.as_str(),
        id,
        view.summary.total,
        view.summary.running,
        view.summary.success,
        view.summary.failed,
        if view.is_complete { " | 已完成" } else { "" }
    );

    for step in &view.steps {
        let duration = step
            .duration_ms
            .map(|ms| format!(" {ms}ms"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {} #{} {}{}",
            status_badge(step.status),
            step.step_order,
            step.step_name,
            duration
        );
        for line in step.output.lines() {
            let _ = writeln!(out, "      {line}");
        }
        if let Some(error) = &step.error {
            let _ = writeln!(out, "      错误: {error}");
        }
    }
    out
}

fn status_badge(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Pending => "[等待]",
        StepStatus::Running => "[运行]",
        StepStatus::Success => "[成功]",
        StepStatus::Failed => "[失败]",
    }
}

fn format_time(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M (%a)").to_string()
}
