use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Timelike};

use crate::error::CronError;
use crate::matcher::{match_field, match_weekday};

/// 标准化后的5个调度字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CronField {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl CronField {
    pub const ALL: [CronField; 5] = [
        CronField::Minute,
        CronField::Hour,
        CronField::DayOfMonth,
        CronField::Month,
        CronField::DayOfWeek,
    ];

    /// 字段取值范围（闭区间）
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            CronField::Minute => (0, 59),
            CronField::Hour => (0, 23),
            CronField::DayOfMonth => (1, 31),
            CronField::Month => (1, 12),
            CronField::DayOfWeek => (0, 7),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CronField::Minute => "minute",
            CronField::Hour => "hour",
            CronField::DayOfMonth => "day_of_month",
            CronField::Month => "month",
            CronField::DayOfWeek => "day_of_week",
        }
    }
}

/// 解析后的CRON表达式
///
/// 解析阶段只校验字段数量，字段内容在匹配时才解释：无法识别的内容不会报错，
/// 只是永远不匹配。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CronExpression {
    minute: String,
    hour: String,
    day_of_month: String,
    month: String,
    day_of_week: String,
}

impl CronExpression {
    /// 解析原始表达式
    ///
    /// 接受5个字段，或首字段恰好为 `"0"` 的6个字段（秒字段被丢弃）。
    pub fn parse(raw: &str) -> Result<Self, CronError> {
        let mut tokens: Vec<&str> = raw.split_whitespace().collect();

        if tokens.len() == 6 && tokens[0] == "0" {
            tokens.remove(0);
        }

        if tokens.len() != 5 {
            return Err(CronError::FieldCount {
                expr: raw.to_string(),
                count: raw.split_whitespace().count(),
            });
        }

        Ok(Self {
            minute: tokens[0].to_string(),
            hour: tokens[1].to_string(),
            day_of_month: tokens[2].to_string(),
            month: tokens[3].to_string(),
            day_of_week: tokens[4].to_string(),
        })
    }

    pub fn minute(&self) -> &str {
        &self.minute
    }

    pub fn hour(&self) -> &str {
        &self.hour
    }

    pub fn day_of_month(&self) -> &str {
        &self.day_of_month
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn day_of_week(&self) -> &str {
        &self.day_of_week
    }

    pub fn field(&self, field: CronField) -> &str {
        match field {
            CronField::Minute => &self.minute,
            CronField::Hour => &self.hour,
            CronField::DayOfMonth => &self.day_of_month,
            CronField::Month => &self.month,
            CronField::DayOfWeek => &self.day_of_week,
        }
    }

    /// 所有字段都是通配符
    pub fn is_wildcard(&self) -> bool {
        CronField::ALL
            .iter()
            .all(|f| matches!(self.field(*f), "*" | "?"))
    }

    /// 使用 `a/n` 形式的字段
    ///
    /// 只有 `*/n` 会被求值，这些字段永远不匹配，调用方应提示用户。
    pub fn restricted_steps(&self) -> Vec<CronField> {
        CronField::ALL
            .iter()
            .copied()
            .filter(|f| {
                self.field(*f)
                    .split_once('/')
                    .is_some_and(|(base, _)| base != "*")
            })
            .collect()
    }

    /// 检查给定时间（按该时区的墙上时间）是否匹配全部字段
    ///
    /// 日期字段与星期字段取逻辑与。
    pub fn matches<Tz: TimeZone>(&self, time: &DateTime<Tz>) -> bool {
        let (min, max) = CronField::Minute.bounds();
        if !match_field(&self.minute, time.minute(), min, max) {
            return false;
        }
        let (min, max) = CronField::Hour.bounds();
        if !match_field(&self.hour, time.hour(), min, max) {
            return false;
        }
        let (min, max) = CronField::DayOfMonth.bounds();
        if !match_field(&self.day_of_month, time.day(), min, max) {
            return false;
        }
        let (min, max) = CronField::Month.bounds();
        if !match_field(&self.month, time.month(), min, max) {
            return false;
        }
        match_weekday(&self.day_of_week, time.weekday().num_days_from_sunday())
    }
}

impl FromStr for CronExpression {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_five_fields() {
        let expr = CronExpression::parse("*/5 9-17 * * MON-FRI").unwrap();
        assert_eq!(expr.minute(), "*/5");
        assert_eq!(expr.hour(), "9-17");
        assert_eq!(expr.day_of_month(), "*");
        assert_eq!(expr.month(), "*");
        assert_eq!(expr.day_of_week(), "MON-FRI");
    }

    #[test]
    fn test_parse_drops_zero_seconds() {
        let six = CronExpression::parse("0 0 2 * * *").unwrap();
        let five = CronExpression::parse("0 2 * * *").unwrap();
        assert_eq!(six, five);
        assert_eq!(six.to_string(), "0 2 * * *");
    }

    #[test]
    fn test_parse_field_count_errors() {
        let err = CronExpression::parse("30 0 2 * * *").unwrap_err();
        assert_eq!(err.kind(), "field-count");
        assert!(CronExpression::parse("").is_err());
        assert!(CronExpression::parse("* * * *").is_err());
        assert!(CronExpression::parse("0 0 0 * * * *").is_err());
    }

    #[test]
    fn test_parse_is_permissive_about_content() {
        let expr: CronExpression = "foo bar baz qux 99".parse().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(!expr.matches(&now));
    }

    #[test]
    fn test_parse_normalizes_whitespace() {
        let expr = CronExpression::parse("  0\t2   *  * *\n").unwrap();
        assert_eq!(expr.to_string(), "0 2 * * *");
    }

    #[test]
    fn test_restricted_steps() {
        let expr = CronExpression::parse("5/10 */2 * * *").unwrap();
        assert_eq!(expr.restricted_steps(), vec![CronField::Minute]);
        assert!(CronExpression::parse("*/10 * * * *")
            .unwrap()
            .restricted_steps()
            .is_empty());
    }

    #[test]
    fn test_day_fields_are_anded() {
        // 2024-01-01 是周一
        let expr = CronExpression::parse("0 0 1 * SUN").unwrap();
        let monday_first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(!expr.matches(&monday_first));

        // 2023-10-01 是周日
        let sunday_first = Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap();
        assert!(expr.matches(&sunday_first));
    }

    #[test]
    fn test_is_wildcard() {
        assert!(CronExpression::parse("* * ? * *").unwrap().is_wildcard());
        assert!(!CronExpression::parse("0 * * * *").unwrap().is_wildcard());
    }
}
