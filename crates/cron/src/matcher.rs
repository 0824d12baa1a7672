//! 单字段匹配规则
//!
//! 支持 `*`/`?`、`a-b`、`a,b,c`、`*/n` 和单个整数。区间不支持回绕（`b < a` 永不匹配），
//! `a/n` 只在语法上接受，不会匹配任何值。

/// 星期名称，下标即星期数（周日为0）
const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// 检查数值字段是否匹配
pub fn match_field(field: &str, value: u32, min: u32, max: u32) -> bool {
    if field == "*" || field == "?" {
        return true;
    }

    if let Some((base, step)) = field.split_once('/') {
        return match_step(base, step, value);
    }

    if field.contains(',') {
        return field
            .split(',')
            .filter_map(|item| item.trim().parse::<u32>().ok())
            .any(|item| item == value);
    }

    if let Some((start, end)) = field.split_once('-') {
        return match (start.trim().parse::<u32>(), end.trim().parse::<u32>()) {
            (Ok(start), Ok(end)) => start <= value && value <= end,
            _ => false,
        };
    }

    match field.trim().parse::<u32>() {
        Ok(literal) => (min..=max).contains(&literal) && literal == value,
        Err(_) => false,
    }
}

/// 检查星期字段是否匹配
///
/// `weekday` 以周日为0；0和7都表示周日。字段中数字（0-7）与 `MON`..`SUN` 可以混用。
pub fn match_weekday(field: &str, weekday: u32) -> bool {
    let weekday = weekday % 7;

    if field == "*" || field == "?" {
        return true;
    }

    if let Some((base, step)) = field.split_once('/') {
        return match_step(base, step, weekday);
    }

    if field.contains(',') {
        return field
            .split(',')
            .filter_map(weekday_number)
            .any(|day| day % 7 == weekday);
    }

    if let Some((start, end)) = field.split_once('-') {
        return match (weekday_number(start), weekday_number(end)) {
            (Some(start), Some(end)) => {
                // 作为区间终点时，周日按7处理：MON-SUN 覆盖整周
                let end = if end == 0 && start > 0 { 7 } else { end };
                let in_range = |day: u32| start <= day && day <= end;
                in_range(weekday) || (weekday == 0 && in_range(7))
            }
            _ => false,
        };
    }

    weekday_number(field).is_some_and(|day| day % 7 == weekday)
}

fn match_step(base: &str, step: &str, value: u32) -> bool {
    if base != "*" {
        return false;
    }
    match step.trim().parse::<u32>() {
        Ok(step) if step > 0 => value % step == 0,
        _ => false,
    }
}

/// 星期记号转数字，数字保持原值（0-7）
pub(crate) fn weekday_number(token: &str) -> Option<u32> {
    let token = token.trim();
    if let Ok(day) = token.parse::<u32>() {
        return (day <= 7).then_some(day);
    }
    WEEKDAY_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(token))
        .map(|index| index as u32)
}
