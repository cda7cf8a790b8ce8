// PeriodCalculator tests: window boundaries, leap years, rollovers,
// previous-period consistency with last_period

use chrono::NaiveDate;
use fleetcap::period::{PeriodBucket, PeriodCalculator, PeriodType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn current_period_contains_today_for_all_granularities() {
    let days = [
        date(2024, 1, 1),
        date(2024, 2, 29),
        date(2024, 6, 15),
        date(2024, 12, 31),
        date(2025, 3, 1),
    ];
    for today in days {
        let calc = PeriodCalculator::fixed(today);
        for period_type in PeriodType::ALL {
            let bucket = calc.current_period(period_type);
            assert!(
                bucket.start <= today && today <= bucket.end,
                "{period_type} window {bucket} does not contain {today}"
            );
        }
    }
}

#[test]
fn current_daily_is_today_only() {
    let calc = PeriodCalculator::fixed(date(2024, 10, 5));
    let bucket = calc.current_period(PeriodType::Daily);
    assert_eq!(bucket, PeriodBucket::new(date(2024, 10, 5), date(2024, 10, 5)));
}

#[test]
fn current_weekly_is_monday_through_sunday() {
    // 2024-10-31 is a Thursday
    let calc = PeriodCalculator::fixed(date(2024, 10, 31));
    let bucket = calc.current_period(PeriodType::Weekly);
    assert_eq!(bucket.start, date(2024, 10, 28));
    assert_eq!(bucket.end, date(2024, 11, 3));
}

#[test]
fn current_weekly_on_monday_starts_same_day() {
    // 2024-10-28 is a Monday
    let calc = PeriodCalculator::fixed(date(2024, 10, 28));
    let bucket = calc.current_period(PeriodType::Weekly);
    assert_eq!(bucket.start, date(2024, 10, 28));
    assert_eq!(bucket.end, date(2024, 11, 3));
}

#[test]
fn current_monthly_handles_leap_february() {
    let calc = PeriodCalculator::fixed(date(2024, 2, 15));
    let bucket = calc.current_period(PeriodType::Monthly);
    assert_eq!(bucket.start, date(2024, 2, 1));
    assert_eq!(bucket.end, date(2024, 2, 29));

    let calc = PeriodCalculator::fixed(date(2023, 2, 15));
    let bucket = calc.current_period(PeriodType::Monthly);
    assert_eq!(bucket.end, date(2023, 2, 28));
}

#[test]
fn current_quarterly_windows() {
    let calc = PeriodCalculator::fixed(date(2024, 10, 5));
    let bucket = calc.current_period(PeriodType::Quarterly);
    assert_eq!(bucket.start, date(2024, 10, 1));
    assert_eq!(bucket.end, date(2024, 12, 31));

    let quarter_ends = [
        (date(2024, 2, 10), date(2024, 3, 31)),
        (date(2024, 5, 1), date(2024, 6, 30)),
        (date(2024, 8, 20), date(2024, 9, 30)),
        (date(2024, 11, 11), date(2024, 12, 31)),
    ];
    for (today, expected_end) in quarter_ends {
        let calc = PeriodCalculator::fixed(today);
        assert_eq!(calc.current_period(PeriodType::Quarterly).end, expected_end);
    }
}

#[test]
fn last_daily_is_yesterday() {
    let calc = PeriodCalculator::fixed(date(2024, 3, 1));
    let bucket = calc.last_period(PeriodType::Daily);
    // leap year: the day before 2024-03-01 is Feb 29
    assert_eq!(bucket, PeriodBucket::new(date(2024, 2, 29), date(2024, 2, 29)));
}

#[test]
fn last_weekly_is_previous_monday_to_sunday() {
    let calc = PeriodCalculator::fixed(date(2024, 10, 31));
    let bucket = calc.last_period(PeriodType::Weekly);
    assert_eq!(bucket.start, date(2024, 10, 21));
    assert_eq!(bucket.end, date(2024, 10, 27));
}

#[test]
fn last_monthly_rolls_over_the_year() {
    let calc = PeriodCalculator::fixed(date(2025, 1, 10));
    let bucket = calc.last_period(PeriodType::Monthly);
    assert_eq!(bucket.start, date(2024, 12, 1));
    assert_eq!(bucket.end, date(2024, 12, 31));
}

#[test]
fn last_monthly_into_leap_february() {
    let calc = PeriodCalculator::fixed(date(2024, 3, 15));
    let bucket = calc.last_period(PeriodType::Monthly);
    assert_eq!(bucket.start, date(2024, 2, 1));
    assert_eq!(bucket.end, date(2024, 2, 29));
}

#[test]
fn last_quarterly_rolls_over_the_year() {
    let calc = PeriodCalculator::fixed(date(2024, 2, 10));
    let bucket = calc.last_period(PeriodType::Quarterly);
    assert_eq!(bucket.start, date(2023, 10, 1));
    assert_eq!(bucket.end, date(2023, 12, 31));
}

#[test]
fn previous_of_current_equals_last_for_slower_cadences() {
    let days = [
        date(2024, 1, 1),
        date(2024, 2, 29),
        date(2024, 7, 4),
        date(2024, 12, 31),
        date(2025, 1, 1),
    ];
    for today in days {
        let calc = PeriodCalculator::fixed(today);
        for period_type in [PeriodType::Weekly, PeriodType::Monthly, PeriodType::Quarterly] {
            let current = calc.current_period(period_type);
            assert_eq!(
                calc.previous_period(period_type, &current),
                calc.last_period(period_type),
                "{period_type} mismatch for today {today}"
            );
        }
    }
}

#[test]
fn previous_daily_single_day_agrees_with_last() {
    let calc = PeriodCalculator::fixed(date(2024, 3, 1));
    let current = calc.current_period(PeriodType::Daily);
    assert_eq!(
        calc.previous_period(PeriodType::Daily, &current),
        calc.last_period(PeriodType::Daily)
    );
}

#[test]
fn previous_daily_multi_day_shifts_by_span() {
    let calc = PeriodCalculator::fixed(date(2024, 6, 1));
    let bucket = PeriodBucket::new(date(2024, 5, 10), date(2024, 5, 12));
    let prev = calc.previous_period(PeriodType::Daily, &bucket);
    assert_eq!(prev, PeriodBucket::new(date(2024, 5, 7), date(2024, 5, 9)));
}

#[test]
fn previous_monthly_shifts_by_calendar_month_not_day_count() {
    let calc = PeriodCalculator::fixed(date(2024, 6, 1));
    // March has 31 days; the previous window is all of February (29 days in 2024)
    let march = PeriodBucket::new(date(2024, 3, 1), date(2024, 3, 31));
    let prev = calc.previous_period(PeriodType::Monthly, &march);
    assert_eq!(prev, PeriodBucket::new(date(2024, 2, 1), date(2024, 2, 29)));
}

#[test]
fn previous_quarterly_shifts_by_three_months() {
    let calc = PeriodCalculator::fixed(date(2024, 6, 1));
    let q1 = PeriodBucket::new(date(2024, 1, 1), date(2024, 3, 31));
    let prev = calc.previous_period(PeriodType::Quarterly, &q1);
    assert_eq!(prev, PeriodBucket::new(date(2023, 10, 1), date(2023, 12, 31)));
}

#[test]
fn period_type_parses_known_values() {
    assert_eq!("daily".parse::<PeriodType>().unwrap(), PeriodType::Daily);
    assert_eq!("weekly".parse::<PeriodType>().unwrap(), PeriodType::Weekly);
    assert_eq!("monthly".parse::<PeriodType>().unwrap(), PeriodType::Monthly);
    assert_eq!(
        "quarterly".parse::<PeriodType>().unwrap(),
        PeriodType::Quarterly
    );
}

#[test]
fn period_type_rejects_unknown_values() {
    let err = "hourly".parse::<PeriodType>().unwrap_err();
    assert!(err.to_string().contains("hourly"));
}
