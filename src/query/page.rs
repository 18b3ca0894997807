use super::types::{PageDefaults, PageParams};

/// `page[offset]` / `page[limit]` with lenient integer parsing: a leading
/// integer prefix is used (`"20abc"` → 20), anything else falls back.
pub fn parse_page(offset: Option<&str>, limit: Option<&str>, defaults: PageDefaults) -> PageParams {
    let offset = offset.and_then(parse_int_prefix).unwrap_or(0).max(0) as u64;

    let max_limit = defaults.max_limit.max(1);
    let requested = match limit.and_then(parse_int_prefix) {
        // zero means "not supplied"
        Some(0) | None => i64::try_from(defaults.default_limit).unwrap_or(i64::MAX),
        Some(n) => n,
    };
    let limit = requested.clamp(1, i64::try_from(max_limit).unwrap_or(i64::MAX)) as u64;

    if limit as i64 != requested {
        tracing::debug!(requested, limit, "page limit clamped");
    }

    PageParams { offset, limit }
}

/// Optional sign followed by digits, after leading whitespace. Saturates
/// instead of overflowing.
fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = &digits[..digits.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add((b - b'0') as i64));
    Some(if negative { -magnitude } else { magnitude })
}
