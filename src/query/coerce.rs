use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Number;

use super::types::Scalar;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})(?:T([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{1,6}))?(?:(Z)|([+-])([0-9]{2}):([0-9]{2}))?)?$",
    )
    .expect("ISO date pattern")
});

/// Convert a raw query-string token into a number, a date or a string.
///
/// Numbers win over dates. Dates must survive a calendar round trip, so
/// `2024-02-30` or `2023-02-29` stay plain strings instead of rolling over.
pub fn coerce(token: &str) -> Scalar {
    if let Some(n) = parse_number(token) {
        return Scalar::Number(n);
    }
    if let Some(dt) = parse_date(token) {
        return Scalar::Date(dt);
    }
    Scalar::String(token.to_string())
}

fn parse_number(token: &str) -> Option<Number> {
    if token.is_empty() || token.trim() != token {
        return None;
    }
    if let Ok(i) = token.parse::<i64>() {
        return Some(Number::from(i));
    }
    // Rust accepts "inf"/"NaN"; those are not finite and fall through
    let f = token.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Some(Number::from(f as i64));
    }
    Number::from_f64(f)
}

fn parse_date(token: &str) -> Option<DateTime<Utc>> {
    let caps = ISO_DATE.captures(token)?;
    let digits = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let (month, day) = (digits(2)?, digits(3)?);

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if date.year() != year || date.month() != month || date.day() != day {
        return None;
    }

    let time = match caps.get(4) {
        Some(_) => {
            let micros = match caps.get(7) {
                Some(m) => format!("{:0<6}", m.as_str()).parse::<u32>().ok()?,
                None => 0,
            };
            NaiveTime::from_hms_micro_opt(digits(4)?, digits(5)?, digits(6)?, micros)?
        }
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };
    let naive = NaiveDateTime::new(date, time);

    match caps.get(9).map(|m| m.as_str()) {
        None => Some(Utc.from_utc_datetime(&naive)),
        Some(sign) => {
            let sign = if sign == "-" { -1 } else { 1 };
            let hours = digits(10)? as i32;
            let minutes = digits(11)? as i32;
            let tz = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?;
            tz.from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}
