use chrono::{DateTime, Duration, Local, Utc};

/// Average Gregorian year, in seconds.
const SECONDS_PER_YEAR: i64 = 31_556_952;
/// A twelfth of the average year.
const SECONDS_PER_MONTH: i64 = 2_629_746;
const SECONDS_PER_DAY: i64 = 86_400;

/// Splits a duration into whole hours, minutes and seconds.
pub fn hours_minutes_seconds(duration: Duration) -> (i64, i64, i64) {
    let total = duration.num_seconds().max(0);
    (total / 3600, (total % 3600) / 60, total % 60)
}

/// Splits a duration into whole years, months and days.
pub fn years_months_days(duration: Duration) -> (i64, i64, i64) {
    let total = duration.num_seconds().max(0);
    let years = total / SECONDS_PER_YEAR;
    let rest = total % SECONDS_PER_YEAR;
    (years, rest / SECONDS_PER_MONTH, (rest % SECONDS_PER_MONTH) / SECONDS_PER_DAY)
}

/// Time elapsed since `start`, clamped at zero.
pub fn elapsed_since(start: DateTime<Utc>) -> Duration {
    (Utc::now() - start).max(Duration::zero())
}

/// Name of the system timezone, e.g. `Europe/Berlin`.
///
/// Taken from `TZ` or `/etc/timezone`; otherwise the current UTC offset.
pub fn local_timezone_name() -> String {
    std::env::var("TZ")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/timezone").ok())
        .map(|name| name.trim().trim_start_matches(':').to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| Local::now().format("UTC%:z").to_string())
}
