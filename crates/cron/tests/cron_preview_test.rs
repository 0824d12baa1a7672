#[cfg(test)]
mod cron_preview_tests {
    use scheduler_cron::*;

    use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
    use proptest::prelude::*;

    fn field_token(min: u32, max: u32) -> impl Strategy<Value = String> {
        prop_oneof![
            Just("*".to_string()),
            (min..=max).prop_map(|v| v.to_string()),
            (min..=max, min..=max).prop_map(|(a, b)| format!("{}-{}", a.min(b), a.max(b))),
            prop::collection::vec(min..=max, 1..4).prop_map(|items| items
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(",")),
            (1..=max.max(1)).prop_map(|n| format!("*/{n}")),
        ]
    }

    const NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

    fn weekday_name() -> impl Strategy<Value = String> {
        (0usize..7, any::<bool>()).prop_map(|(i, lower)| {
            if lower {
                NAMES[i].to_lowercase()
            } else {
                NAMES[i].to_string()
            }
        })
    }

    fn weekday_token() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("*".to_string()),
            Just("?".to_string()),
            Just("MON-FRI".to_string()),
            Just("SAT,SUN".to_string()),
            (0u32..=7).prop_map(|v| v.to_string()),
            weekday_name(),
            (0u32..=6, 0u32..=7).prop_map(|(a, b)| format!("{}-{}", a.min(b), a.max(b))),
            (1u32..=6, weekday_name()).prop_map(|(a, name)| format!("{a}-{name}")),
            (weekday_name(), 0u32..=7).prop_map(|(name, b)| format!("{name}-{b}")),
            prop::collection::vec(weekday_name(), 1..4).prop_map(|items| items.join(",")),
        ]
    }

    fn expression() -> impl Strategy<Value = String> {
        (
            field_token(0, 59),
            field_token(0, 23),
            prop_oneof![
                Just("*".to_string()),
                Just("?".to_string()),
                field_token(1, 31)
            ],
            prop_oneof![Just("*".to_string()), field_token(1, 12)],
            weekday_token(),
        )
            .prop_map(|(m, h, dom, mon, dow)| format!("{m} {h} {dom} {mon} {dow}"))
    }

    fn brute_force_matches(expr: &CronExpression, t: &DateTime<Utc>) -> bool {
        match_field(expr.minute(), t.minute(), 0, 59)
            && match_field(expr.hour(), t.hour(), 0, 23)
            && match_field(expr.day_of_month(), t.day(), 1, 31)
            && match_field(expr.month(), t.month(), 1, 12)
            && match_weekday(expr.day_of_week(), t.weekday().num_days_from_sunday())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn upcoming_runs_are_increasing_and_match(
            raw in expression(),
            offset_minutes in 0i64..(365 * 24 * 60),
            seconds in 0u32..60,
        ) {
            let expr = CronExpression::parse(&raw).unwrap();
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, seconds).unwrap();
            let from = base + Duration::minutes(offset_minutes);
            let runs = next_executions(&expr, &from, 5);

            prop_assert!(runs.len() <= 5);
            for pair in runs.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for run in &runs {
                prop_assert!(*run >= from);
                prop_assert_eq!(run.second(), 0);
                prop_assert!(brute_force_matches(&expr, run), "{} at {}", raw, run);
            }

            // 首次执行之前不应存在被跳过的匹配时间
            let start = if from.second() == 0 {
                from
            } else {
                from - Duration::seconds(i64::from(from.second())) + Duration::minutes(1)
            };
            let limit = runs
                .first()
                .copied()
                .unwrap_or(start + Duration::minutes(i64::from(SEARCH_LIMIT_MINUTES)));
            let mut t = start;
            while t < limit {
                prop_assert!(!brute_force_matches(&expr, &t), "skipped {} for {}", t, raw);
                t += Duration::minutes(1);
            }
        }

        #[test]
        fn weekday_names_match_their_numbers(
            start in 0u32..=6,
            end in 0u32..=6,
            lower in any::<bool>(),
            day in 0u32..7,
        ) {
            let name = |n: u32| {
                let name = NAMES[n as usize];
                if lower { name.to_lowercase() } else { name.to_string() }
            };
            let numeric = format!("{start}-{end}");
            prop_assert_eq!(
                match_weekday(&format!("{start}-{}", name(end)), day),
                match_weekday(&numeric, day)
            );
            prop_assert_eq!(
                match_weekday(&format!("{}-{}", name(start), name(end)), day),
                match_weekday(&numeric, day)
            );
            prop_assert!(match_weekday(&name(day), day));
            prop_assert_eq!(match_weekday("?", day), match_weekday("*", day));
        }

        #[test]
        fn describe_never_panics(raw in ".{0,40}") {
            let text = describe(&raw);
            prop_assert!(!text.is_empty());
        }

        #[test]
        fn six_field_form_describes_like_five(raw in expression()) {
            prop_assert_eq!(describe(&format!("0 {raw}")), describe(&raw));
        }
    }

    #[test]
    fn test_every_quarter_hour_sequence() {
        let expr = CronExpression::parse("*/15 * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 10, 7, 12).unwrap();
        let runs = next_executions(&expr, &now, 4);
        let minutes: Vec<u32> = runs.iter().map(|t| t.minute()).collect();
        assert_eq!(minutes, vec![15, 30, 45, 0]);
        assert_eq!(runs[3].hour(), 11);
    }

    #[test]
    fn test_daily_two_am_not_before_reference() {
        let expr = CronExpression::parse("0 2 * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 28, 23, 59, 59).unwrap();
        let runs = next_executions(&expr, &now, 2);
        assert_eq!(runs[0], Utc.with_ymd_and_hms(2024, 2, 29, 2, 0, 0).unwrap());
        assert_eq!(runs[1], Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_validation_error_conversion() {
        let err = CronExpression::parse("1 2 3").unwrap_err();
        let unified: scheduler_core::SchedulerError = err.into();
        assert!(matches!(
            unified,
            scheduler_core::SchedulerError::InvalidCron { .. }
        ));
    }
}
