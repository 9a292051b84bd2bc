//! Parsing and formatting of human-entered focus durations.
//!
//! Accepts an optional hour part followed by an optional minute part,
//! each an integer glued to its unit letter ("2h", "30m", "1h30m"),
//! case-insensitive, nothing else. At least one part must be present.

const MINUTE_MS: i64 = 60_000;

/// Parse a duration string into milliseconds.
///
/// Returns `None` for the empty string, for strings with neither an
/// hour nor a minute part, and for any extraneous character.
pub fn parse_duration(text: &str) -> Option<i64> {
    let lowered = text.trim().to_lowercase();
    let bytes = lowered.as_bytes();

    let mut pos = 0;
    let mut hours = 0i64;
    let mut minutes = 0i64;

    let (value, next) = read_number(bytes, pos)?;
    let mut have_minutes = false;
    match bytes.get(next) {
        Some(b'h') => hours = value,
        Some(b'm') => {
            minutes = value;
            have_minutes = true;
        }
        _ => return None,
    }
    pos = next + 1;

    if !have_minutes && pos < bytes.len() {
        let (value, next) = read_number(bytes, pos)?;
        if bytes.get(next) != Some(&b'm') {
            return None;
        }
        minutes = value;
        pos = next + 1;
    }

    if pos != bytes.len() {
        return None;
    }
    // totals that fit in i64 as digits can still overflow the ms conversion
    hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(MINUTE_MS)
}

fn read_number(bytes: &[u8], start: usize) -> Option<(i64, usize)> {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return None;
    }
    let value = std::str::from_utf8(&bytes[start..end]).ok()?.parse().ok()?;
    Some((value, end))
}

/// Render milliseconds as "2h", "30m", or "1h 30m" (whole minutes,
/// floored). Negative input is an out-of-contract caller error.
pub fn format_duration(ms: i64) -> String {
    let total_min = ms / MINUTE_MS;
    let hours = total_min / 60;
    let minutes = total_min % 60;
    if hours > 0 && minutes > 0 {
        format!("{hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{minutes}m")
    }
}
