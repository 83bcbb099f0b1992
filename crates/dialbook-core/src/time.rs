use chrono::{DateTime, Duration, NaiveDate, Utc};

pub const SECONDS_PER_DAY: i64 = 86_400;

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn timestamp_date(ts: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .date_naive()
}

/// Start (UTC midnight) of the window covering the last `days` calendar days,
/// today included.
pub fn day_window_start(now_utc: i64, days: i64) -> i64 {
    let today = timestamp_date(now_utc);
    let first = today - Duration::days(days.max(1) - 1);
    first
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().timestamp())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{day_window_start, format_timestamp_datetime, timestamp_date};
    use chrono::NaiveDate;

    #[test]
    fn format_timestamp_is_utc() {
        assert_eq!(format_timestamp_datetime(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp_datetime(1_700_000_000), "2023-11-14 22:13:20");
    }

    #[test]
    fn window_start_includes_today() {
        let now = 1_700_000_000;
        let today = timestamp_date(now);
        assert_eq!(today, NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        assert_eq!(day_window_start(now, 1), 1_699_920_000);
        assert_eq!(day_window_start(now, 3), 1_699_920_000 - 2 * 86_400);
        assert_eq!(day_window_start(now, 0), day_window_start(now, 1));
    }
}
