use crate::schema::DateOrder;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use splines::{Interpolation, Key, Spline};

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%y", "%d.%m.%Y",
];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y", "%m.%d.%y", "%m.%d.%Y",
];

pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn year_start(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

/// Parses a ledger date cell, discarding any time component.
///
/// ISO dates always parse. Slash/dash/dot separated day-month dates are tried
/// in the preferred `order` first and the opposite order as a fallback, so
/// `13/01/2023` still parses when month-first is preferred.
pub fn parse_ledger_date(raw: &str, order: DateOrder) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    let (date_part, _) = raw.split_once(' ').unwrap_or((raw, ""));

    if starts_with_full_year(raw) {
        let datetime = ISO_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok());
        if let Some(dt) = datetime {
            return Some(dt.date());
        }
        return ISO_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok());
    }

    let (preferred, fallback) = match order {
        DateOrder::DayFirst => (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS),
        DateOrder::MonthFirst => (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS),
    };

    preferred
        .iter()
        .chain(fallback.iter())
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

// `%Y` accepts one to four digits, so "02-01-23" would otherwise read as year 2.
fn starts_with_full_year(raw: &str) -> bool {
    let mut chars = raw.chars();
    chars.by_ref().take(4).filter(|c| c.is_ascii_digit()).count() == 4
        && !chars.next().is_some_and(|c| c.is_ascii_digit())
}

/// Coerces a numeric cell. Empty, unparsable and non-finite values are missing.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Fills missing values linearly along slice position, only between two known
/// values. Leading and trailing gaps stay missing. Returns how many slots were
/// filled.
///
/// Each gap is sampled from a two-key spline over its bounding values, so a
/// column is filled in a single pass.
pub fn interpolate_interior(values: &mut [Option<f64>]) -> usize {
    let mut filled = 0;
    let mut last_known: Option<(usize, f64)> = None;

    for idx in 0..values.len() {
        let Some(value) = values[idx] else {
            continue;
        };

        if let Some((start, start_value)) = last_known {
            if idx > start + 1 {
                let segment = Spline::from_vec(vec![
                    Key::new(start as f64, start_value, Interpolation::Linear),
                    Key::new(idx as f64, value, Interpolation::Linear),
                ]);
                for gap in start + 1..idx {
                    if let Some(sampled) = segment.sample(gap as f64) {
                        values[gap] = Some(sampled);
                        filled += 1;
                    }
                }
            }
        }
        last_known = Some((idx, value));
    }

    filled
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // Sunday belongs to the week that started the previous Monday.
        assert_eq!(week_start(ymd(2023, 1, 8)), ymd(2023, 1, 2));
        assert_eq!(week_start(ymd(2023, 1, 9)), ymd(2023, 1, 9));
        assert_eq!(week_start(ymd(2023, 1, 1)), ymd(2022, 12, 26));
    }

    #[test]
    fn test_month_and_year_start() {
        assert_eq!(month_start(ymd(2024, 2, 29)), ymd(2024, 2, 1));
        assert_eq!(year_start(ymd(2024, 7, 15)), ymd(2024, 1, 1));
    }

    #[test]
    fn test_parse_ledger_date_formats() {
        assert_eq!(
            parse_ledger_date("2023-01-02", DateOrder::DayFirst),
            Some(ymd(2023, 1, 2))
        );
        assert_eq!(
            parse_ledger_date("2023-01-02 14:35:00", DateOrder::DayFirst),
            Some(ymd(2023, 1, 2))
        );
        assert_eq!(
            parse_ledger_date("2023-01-02T14:35:00+02:00", DateOrder::DayFirst),
            Some(ymd(2023, 1, 2))
        );
        assert_eq!(
            parse_ledger_date("02/01/2023", DateOrder::DayFirst),
            Some(ymd(2023, 1, 2))
        );
        assert_eq!(
            parse_ledger_date("02/01/2023", DateOrder::MonthFirst),
            Some(ymd(2023, 2, 1))
        );
        assert_eq!(
            parse_ledger_date("02/01/2023 09:15", DateOrder::DayFirst),
            Some(ymd(2023, 1, 2))
        );
        assert_eq!(
            parse_ledger_date("02/01/23", DateOrder::DayFirst),
            Some(ymd(2023, 1, 2))
        );
    }

    #[test]
    fn test_parse_ledger_date_falls_back_to_other_order() {
        assert_eq!(
            parse_ledger_date("13/01/2023", DateOrder::MonthFirst),
            Some(ymd(2023, 1, 13))
        );
        assert_eq!(
            parse_ledger_date("01/13/2023", DateOrder::DayFirst),
            Some(ymd(2023, 1, 13))
        );
    }

    #[test]
    fn test_two_digit_years_are_not_read_as_iso() {
        assert_eq!(
            parse_ledger_date("02-01-23", DateOrder::DayFirst),
            Some(ymd(2023, 1, 2))
        );
        assert!(starts_with_full_year("2023-01-02"));
        assert!(!starts_with_full_year("02-01-23"));
        assert!(!starts_with_full_year("20230102"));
    }

    #[test]
    fn test_parse_ledger_date_rejects_garbage() {
        assert_eq!(parse_ledger_date("", DateOrder::DayFirst), None);
        assert_eq!(parse_ledger_date("   ", DateOrder::DayFirst), None);
        assert_eq!(parse_ledger_date("not a date", DateOrder::DayFirst), None);
        assert_eq!(parse_ledger_date("31/31/2023", DateOrder::DayFirst), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000"), Some(1000.0));
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount("-3"), Some(-3.0));
        assert_eq!(parse_amount("1e3"), Some(1000.0));
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("1,000"), None);
    }

    #[test]
    fn test_interpolate_interior_fills_midpoint() {
        let mut values = vec![Some(100.0), None, Some(200.0)];
        let filled = interpolate_interior(&mut values);
        assert_eq!(filled, 1);
        assert!((values[1].unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_interior_spans_longer_gaps() {
        let mut values = vec![Some(0.0), None, None, None, Some(40.0)];
        assert_eq!(interpolate_interior(&mut values), 3);
        let filled: Vec<f64> = values.iter().map(|v| v.unwrap()).collect();
        for (actual, expected) in filled.iter().zip([0.0, 10.0, 20.0, 30.0, 40.0]) {
            assert!((actual - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_interpolate_interior_leaves_edges_missing() {
        let mut values = vec![None, None, Some(10.0), None, Some(30.0), None];
        assert_eq!(interpolate_interior(&mut values), 1);
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert!((values[3].unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(values[5], None);
    }

    #[test]
    fn test_interpolate_interior_needs_two_known_values() {
        let mut values = vec![None, Some(5.0), None];
        assert_eq!(interpolate_interior(&mut values), 0);
        assert_eq!(values, vec![None, Some(5.0), None]);

        let mut empty: Vec<Option<f64>> = Vec::new();
        assert_eq!(interpolate_interior(&mut empty), 0);
    }

    #[test]
    fn test_interpolate_interior_handles_long_columns() {
        let mut values: Vec<Option<f64>> = (0..100_000)
            .map(|i| if i % 3 == 1 { None } else { Some(i as f64) })
            .collect();

        assert_eq!(interpolate_interior(&mut values), 33_333);
        for (idx, value) in values.iter().enumerate() {
            assert!((value.unwrap() - idx as f64).abs() < 1e-6);
        }
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(20.0), "20.00%");
        assert_eq!(format_percentage(-3.456), "-3.46%");
    }
}
