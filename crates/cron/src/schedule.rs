use chrono::{DateTime, Duration, TimeZone, Timelike};
use tracing::{debug, warn};

use crate::expression::CronExpression;

/// 向前搜索的上限：30天内的分钟数
pub const SEARCH_LIMIT_MINUTES: u32 = 30 * 24 * 60;

/// 计算从 `from` 开始的若干次执行时间
///
/// 起点向上取整到整分钟，然后逐分钟检查。搜索范围内找不到足够的匹配时返回较短的列表，
/// 这不是错误，表示近期没有可见的执行。
pub fn next_executions<Tz: TimeZone>(
    expr: &CronExpression,
    from: &DateTime<Tz>,
    count: usize,
) -> Vec<DateTime<Tz>> {
    let mut executions = Vec::with_capacity(count.min(64));
    if count == 0 {
        return executions;
    }

    for field in expr.restricted_steps() {
        warn!(
            cron = %expr,
            field = field.name(),
            "仅支持 */n 形式的步长，该字段不会匹配任何时间"
        );
    }

    let mut candidate = ceil_to_minute(from);
    for _ in 0..SEARCH_LIMIT_MINUTES {
        if expr.matches(&candidate) {
            executions.push(candidate.clone());
            if executions.len() == count {
                return executions;
            }
        }
        candidate = candidate + Duration::minutes(1);
    }

    debug!(
        cron = %expr,
        requested = count,
        found = executions.len(),
        "在搜索范围内未找到足够的执行时间"
    );
    executions
}

/// 秒和纳秒归零；不在整分钟上时进到下一分钟
fn ceil_to_minute<Tz: TimeZone>(from: &DateTime<Tz>) -> DateTime<Tz> {
    let seconds = i64::from(from.second());
    let nanos = i64::from(from.nanosecond());
    if seconds == 0 && nanos == 0 {
        return from.clone();
    }
    from.clone() - Duration::seconds(seconds) - Duration::nanoseconds(nanos) + Duration::minutes(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};

    #[test]
    fn test_ceil_to_minute() {
        let exact = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        assert_eq!(ceil_to_minute(&exact), exact);

        let partial = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 1).unwrap();
        assert_eq!(
            ceil_to_minute(&partial),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 31, 0).unwrap()
        );

        let nanos = exact + Duration::milliseconds(250);
        assert_eq!(
            ceil_to_minute(&nanos),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 31, 0).unwrap()
        );
    }

    #[test]
    fn test_daily_at_two() {
        let expr = CronExpression::parse("0 2 * * *").unwrap();

        let before = Utc.with_ymd_and_hms(2024, 1, 1, 1, 59, 30).unwrap();
        assert_eq!(
            next_executions(&expr, &before, 1),
            vec![Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap()]
        );

        let after = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 1).unwrap();
        assert_eq!(
            next_executions(&expr, &after, 1),
            vec![Utc.with_ymd_and_hms(2024, 1, 2, 2, 0, 0).unwrap()]
        );

        let on_boundary = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        assert_eq!(next_executions(&expr, &on_boundary, 1), vec![on_boundary]);
    }

    #[test]
    fn test_upcoming_hours() {
        let expr = CronExpression::parse("0 0 * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        let upcoming = next_executions(&expr, &now, 3);

        let hours: Vec<u32> = upcoming.iter().map(|t| t.hour()).collect();
        assert_eq!(hours, vec![13, 14, 15]);
    }

    #[test]
    fn test_zero_count() {
        let expr = CronExpression::parse("* * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(next_executions(&expr, &now, 0).is_empty());
    }

    #[test]
    fn test_horizon_exhausted() {
        // 2月30日不存在
        let expr = CronExpression::parse("0 0 30 2 *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert!(next_executions(&expr, &now, 3).is_empty());

        // 每年一次，30天内最多出现一次
        let yearly = CronExpression::parse("0 0 1 2 *").unwrap();
        let found = next_executions(&yearly, &now, 3);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].month(), 2);
        assert_eq!(found[0].day(), 1);
    }

    #[test]
    fn test_business_days_skip_weekend() {
        let expr = CronExpression::parse("0 9 * * MON-FRI").unwrap();
        // 2024-01-05 是周五
        let friday_noon = Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap();
        let next = next_executions(&expr, &friday_noon, 1);
        assert_eq!(next, vec![Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap()]);
    }

    #[test]
    fn test_restricted_step_never_matches() {
        let expr = CronExpression::parse("5/10 * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(next_executions(&expr, &now, 1).is_empty());
    }

    #[test]
    fn test_fixed_offset_wall_clock() {
        use chrono::FixedOffset;

        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();
        let expr = CronExpression::parse("0 2 * * *").unwrap();
        let from = shanghai.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        let next = next_executions(&expr, &from, 1);
        assert_eq!(next, vec![shanghai.with_ymd_and_hms(2024, 1, 2, 2, 0, 0).unwrap()]);
    }
}
