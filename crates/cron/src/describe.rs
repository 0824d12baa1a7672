use crate::expression::{CronExpression, CronField};
use crate::matcher::weekday_number;

/// 字段数量错误时的描述
pub const INVALID_DESCRIPTION: &str = "无效的表达式";

/// 全部字段为通配符时的描述
pub const CUSTOM_DESCRIPTION: &str = "自定义表达式";

/// 常用表达式及其固定描述（按标准化后的5字段文本匹配）
const PRESETS: &[(&str, &str)] = &[
    ("* * * * *", "每分钟执行"),
    ("*/5 * * * *", "每5分钟执行"),
    ("*/10 * * * *", "每10分钟执行"),
    ("*/30 * * * *", "每30分钟执行"),
    ("0 * * * *", "每小时整点执行"),
    ("0 */2 * * *", "每2小时执行"),
    ("0 0 * * *", "每天午夜执行"),
    ("0 2 * * *", "每天凌晨2点执行"),
    ("0 9 * * 1-5", "工作日每天9点执行"),
    ("0 9 * * MON-FRI", "工作日每天9点执行"),
    ("0 0 * * 0", "每周日午夜执行"),
    ("0 0 1 * *", "每月1日午夜执行"),
];

const WEEKDAY_LABELS: [&str; 7] = ["周日", "周一", "周二", "周三", "周四", "周五", "周六"];

/// 生成原始表达式的可读描述，无法解析时返回 [`INVALID_DESCRIPTION`]
pub fn describe(raw: &str) -> String {
    match CronExpression::parse(raw) {
        Ok(expr) => describe_expression(&expr),
        Err(_) => INVALID_DESCRIPTION.to_string(),
    }
}

/// 生成已解析表达式的可读描述
pub fn describe_expression(expr: &CronExpression) -> String {
    let canonical = expr.to_string();
    if let Some((_, text)) = PRESETS.iter().find(|(preset, _)| *preset == canonical) {
        return (*text).to_string();
    }

    let fragments: Vec<String> = [
        CronField::Month,
        CronField::DayOfWeek,
        CronField::DayOfMonth,
        CronField::Hour,
        CronField::Minute,
    ]
    .iter()
    .filter_map(|field| fragment(*field, expr.field(*field)))
    .collect();

    if fragments.is_empty() {
        return CUSTOM_DESCRIPTION.to_string();
    }
    format!("{}执行", fragments.join("，"))
}

fn fragment(field: CronField, token: &str) -> Option<String> {
    if matches!(token, "*" | "?") {
        return None;
    }

    if let Some(step) = token.strip_prefix("*/") {
        let text = match field {
            CronField::Minute => format!("每{step}分钟"),
            CronField::Hour => format!("每{step}小时"),
            CronField::DayOfMonth => format!("每{step}天"),
            CronField::Month => format!("每{step}个月"),
            CronField::DayOfWeek => format!("每{step}天（按星期）"),
        };
        return Some(text);
    }

    let text = match field {
        CronField::Minute => format!("{token}分"),
        CronField::Hour => format!("{token}点"),
        CronField::DayOfMonth => format!("{token}日"),
        CronField::Month => format!("{token}月"),
        CronField::DayOfWeek => weekday_text(token),
    };
    Some(text)
}

fn weekday_text(token: &str) -> String {
    if token.contains(',') {
        return token
            .split(',')
            .map(weekday_label)
            .collect::<Vec<_>>()
            .join("、");
    }
    if let Some((start, end)) = token.split_once('-') {
        return format!("{}至{}", weekday_label(start), weekday_label(end));
    }
    weekday_label(token)
}

fn weekday_label(token: &str) -> String {
    match weekday_number(token) {
        Some(day) => WEEKDAY_LABELS[(day % 7) as usize].to_string(),
        None => token.trim().to_string(),
    }
}
