//! Duration literals in the InfluxQL style (`10s`, `5m`, `1ms`, `2w`).
//!
//! A literal is one or more `<digits><unit>` segments. Supported units:
//!
//! | unit      | meaning      |
//! |-----------|--------------|
//! | `ns`      | nanoseconds  |
//! | `u`, `µ`  | microseconds |
//! | `ms`      | milliseconds |
//! | `s`       | seconds      |
//! | `m`       | minutes      |
//! | `h`       | hours        |
//! | `d`       | days         |
//! | `w`       | weeks        |

use std::time::Duration;

use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: u128 = 24 * NANOS_PER_HOUR;
const NANOS_PER_WEEK: u128 = 7 * NANOS_PER_DAY;

/// Largest duration a literal may spell, matching a signed 64-bit
/// nanosecond count.
const MAX_NANOS: u128 = i64::MAX as u128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("overflowed duration {0}: choose a smaller duration")]
    Overflow(String),
}

/// Parses a duration literal such as `10s` or `1h30m`.
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(text.to_string());
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    let mut i = 0;
    while i < chars.len() {
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i == start || i >= chars.len() {
            return Err(invalid());
        }
        let digits: String = chars[start..i].iter().collect();
        let measure: u128 = digits
            .parse()
            .map_err(|_| DurationError::Overflow(text.to_string()))?;

        let next_is_s = chars.get(i + 1) == Some(&'s');
        let (scale, width) = match chars[i] {
            'n' if next_is_s => (1, 2),
            'u' | 'µ' => (NANOS_PER_MICRO, 1),
            'm' if next_is_s => (NANOS_PER_MILLI, 2),
            'm' => (NANOS_PER_MINUTE, 1),
            's' => (NANOS_PER_SECOND, 1),
            'h' => (NANOS_PER_HOUR, 1),
            'd' => (NANOS_PER_DAY, 1),
            'w' => (NANOS_PER_WEEK, 1),
            _ => return Err(invalid()),
        };
        i += width;

        total = measure
            .checked_mul(scale)
            .and_then(|n| total.checked_add(n))
            .filter(|n| *n <= MAX_NANOS)
            .ok_or_else(|| DurationError::Overflow(text.to_string()))?;
    }

    let secs = (total / NANOS_PER_SECOND) as u64;
    let nanos = (total % NANOS_PER_SECOND) as u32;
    Ok(Duration::new(secs, nanos))
}

/// Formats a duration using the largest unit that represents it exactly.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    let units = [
        (NANOS_PER_WEEK, "w"),
        (NANOS_PER_DAY, "d"),
        (NANOS_PER_HOUR, "h"),
        (NANOS_PER_MINUTE, "m"),
        (NANOS_PER_SECOND, "s"),
        (NANOS_PER_MILLI, "ms"),
        (NANOS_PER_MICRO, "u"),
    ];
    for (scale, unit) in units {
        if nanos % scale == 0 {
            return format!("{}{}", nanos / scale, unit);
        }
    }
    format!("{}ns", nanos)
}
