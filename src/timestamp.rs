/*!
 * Timestamp parsing and LRC timestamp formatting.
 *
 * Subtitle documents and user supplied time windows share one textual grammar:
 * `HH:MM:SS.mmm` or `MM:SS.mmm`, with either `.` or `,` as the decimal separator
 * and an optional fractional part. Everything is converted to elapsed seconds.
 */

use crate::errors::SubtitleError;

/// Seconds per hour
const SECS_PER_HOUR: f64 = 3600.0;

/// Seconds per minute
const SECS_PER_MINUTE: f64 = 60.0;

/// Absorbs binary representation error before truncating to hundredths,
/// so that e.g. 0.29 renders as 29 centiseconds rather than 28.
const CENTISECOND_TOLERANCE: f64 = 1e-6;

/// Parse a textual timestamp into elapsed seconds.
///
/// Accepts `HH:MM:SS.mmm`, `MM:SS.mmm` and their comma-decimal variants.
/// A missing fractional part is treated as `.000`.
pub fn parse_timestamp(text: &str) -> Result<f64, SubtitleError> {
    let malformed = || SubtitleError::MalformedTimestamp(text.to_string());

    let normalized = text.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (parse_whole(h), parse_whole(m), parse_seconds(s)),
        [m, s] => (Some(0), parse_whole(m), parse_seconds(s)),
        _ => return Err(malformed()),
    };

    match (hours, minutes, seconds) {
        (Some(h), Some(m), Some(s)) => {
            Ok(h as f64 * SECS_PER_HOUR + m as f64 * SECS_PER_MINUTE + s)
        }
        _ => Err(malformed()),
    }
}

// @parses: Unsigned integer component (hours or minutes)
fn parse_whole(part: &str) -> Option<u64> {
    if !is_digits(part) {
        return None;
    }
    part.parse().ok()
}

// @parses: Seconds component with optional fraction
fn parse_seconds(part: &str) -> Option<f64> {
    let (whole, fraction) = part.split_once('.').unwrap_or((part, "000"));
    if !is_digits(whole) || !(fraction.is_empty() || is_digits(fraction)) {
        return None;
    }

    let value: f64 = format!("{}.{}", whole, if fraction.is_empty() { "0" } else { fraction })
        .parse()
        .ok()?;
    value.is_finite().then_some(value)
}

fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Truncate a non-negative seconds value to whole hundredths of a second.
pub fn to_centiseconds(seconds: f64) -> u64 {
    debug_assert!(seconds >= 0.0, "negative timestamps must be dropped before formatting");
    (seconds.max(0.0) * 100.0 + CENTISECOND_TOLERANCE).floor() as u64
}

/// Format seconds as an LRC time tag, `[MM:SS.CC]`.
///
/// Minutes are not wrapped at 60 and hundredths are truncated, not rounded.
pub fn format_lrc_timestamp(seconds: f64) -> String {
    let total = to_centiseconds(seconds);
    let minutes = total / 6000;
    let secs = (total % 6000) / 100;
    let centis = total % 100;

    format!("[{:02}:{:02}.{:02}]", minutes, secs, centis)
}
