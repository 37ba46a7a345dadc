//! Human wording for the distance between two instants ("3 days", "about 2 years").

use chrono::{Datelike, NaiveDateTime};

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2520;
const MINUTES_IN_MONTH: i64 = 43200;
const MINUTES_IN_TWO_MONTHS: i64 = 86400;

/// Distance between `a` and `b` in words. Order of the arguments does not matter.
pub fn format_distance(a: NaiveDateTime, b: NaiveDateTime) -> String {
    let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
    let seconds = (later - earlier).num_seconds();
    let minutes = rounded_div(seconds, 60);

    if minutes == 0 {
        "less than a minute".to_string()
    } else if minutes < 45 {
        counted(minutes, "minute")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < MINUTES_IN_DAY {
        format!("about {}", counted(rounded_div(minutes, 60), "hour"))
    } else if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        "1 day".to_string()
    } else if minutes < MINUTES_IN_MONTH {
        counted(rounded_div(minutes, MINUTES_IN_DAY), "day")
    } else if minutes < MINUTES_IN_TWO_MONTHS {
        format!(
            "about {}",
            counted(rounded_div(minutes, MINUTES_IN_MONTH), "month")
        )
    } else {
        let months = whole_months_between(earlier, later);
        if months < 12 {
            return counted(rounded_div(minutes, MINUTES_IN_MONTH), "month");
        }

        let years = months / 12;
        match months % 12 {
            0..=2 => format!("about {}", counted(years, "year")),
            3..=8 => format!("over {}", counted(years, "year")),
            _ => format!("almost {}", counted(years + 1, "year")),
        }
    }
}

/// `"<distance> ago"`, measured from `published` to `now`.
pub fn time_ago(published: NaiveDateTime, now: NaiveDateTime) -> String {
    format!("{} ago", format_distance(published, now))
}

fn counted(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

// Half rounds up; both operands are non-negative here.
fn rounded_div(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2) / divisor
}

fn whole_months_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month())
        - i64::from(earlier.month());
    if (later.day(), later.time()) < (earlier.day(), earlier.time()) {
        months -= 1;
    }
    months
}
