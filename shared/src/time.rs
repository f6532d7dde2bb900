//! Elapsed-time codec for roast checkpoints
//!
//! Roast checkpoints are entered as `MM:SS` strings and stored as whole
//! seconds since charge. A value of `0` doubles as "not logged", so it is
//! rendered as the `-` placeholder.

/// Placeholder rendered for any value that is missing or not derivable
pub const EMPTY_DISPLAY: &str = "-";

/// Largest minute value accepted from input
pub const MAX_MINUTES: u32 = 99;

/// Largest second value accepted from input
pub const MAX_SECONDS: u32 = 59;

/// Convert an `MM:SS` string to seconds.
///
/// Minutes are clamped to 0..=99 and seconds to 0..=59. Anything that is not
/// two digit groups around a single colon yields `0`.
pub fn parse_time(input: &str) -> u32 {
    let trimmed = input.trim();
    let Some((minutes, seconds)) = trimmed.split_once(':') else {
        return 0;
    };
    if seconds.contains(':') {
        return 0;
    }

    match (parse_component(minutes, MAX_MINUTES), parse_component(seconds, MAX_SECONDS)) {
        (Some(m), Some(s)) => m * 60 + s,
        _ => 0,
    }
}

/// Parse a checkpoint time for storage, treating `0` as not logged
pub fn parse_checkpoint_time(input: &str) -> Option<u32> {
    match parse_time(input) {
        0 => None,
        seconds => Some(seconds),
    }
}

/// Parse a time cell written by an export.
///
/// Derived times such as cooling start may run past 99 minutes, so minutes
/// are not clamped here. Seconds are still capped at 59 and `0` is not logged.
pub fn parse_recorded_time(input: &str) -> Option<u32> {
    let (minutes, seconds) = input.trim().split_once(':')?;
    if seconds.contains(':') {
        return None;
    }
    let minutes = parse_component(minutes, u32::MAX)?;
    let seconds = parse_component(seconds, MAX_SECONDS)?;
    match minutes.checked_mul(60)?.checked_add(seconds)? {
        0 => None,
        total => Some(total),
    }
}

/// Render seconds as zero-padded `MM:SS`, or `-` for zero
pub fn format_time(seconds: u32) -> String {
    if seconds == 0 {
        return EMPTY_DISPLAY.to_string();
    }
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Render an optional time, `-` when absent
pub fn format_optional_time(seconds: Option<u32>) -> String {
    format_time(seconds.unwrap_or(0))
}

/// Keystroke normalization for a time field.
///
/// Keeps digits and colons, inserts the colon once two minute digits have
/// been typed, drops any segment after the second and clamps out-of-range
/// minutes and seconds. Applying it twice gives the same string.
pub fn normalize_time_input(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ':')
        .collect();

    let mut parts = cleaned.split(':');
    let minutes = clamp_segment(parts.next().unwrap_or_default(), MAX_MINUTES);

    match parts.next() {
        Some(seconds) => format!("{}:{}", minutes, clamp_segment(seconds, MAX_SECONDS)),
        // Clamping "123" to "99" must also get the colon
        None if minutes.len() == 2 => format!("{}:", minutes),
        None => minutes,
    }
}

/// Blur normalization: normalize, then zero-pad a complete `M:S` value
pub fn finalize_time_input(raw: &str) -> String {
    let normalized = normalize_time_input(raw);
    match normalized.split_once(':') {
        Some((minutes, seconds)) if !minutes.is_empty() && !seconds.is_empty() => {
            format!("{:0>2}:{:0>2}", minutes, seconds)
        }
        _ => normalized,
    }
}

fn parse_component(part: &str, max: u32) -> Option<u32> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // Digit strings too long for u32 are still "over the limit"
    Some(part.parse::<u32>().map_or(max, |v| v.min(max)))
}

fn clamp_segment(segment: &str, max: u32) -> String {
    if segment.is_empty() {
        return String::new();
    }
    match segment.parse::<u32>() {
        Ok(value) if value <= max => segment.to_string(),
        _ => max.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_time_basic() {
        assert_eq!(parse_time("10:00"), 600);
        assert_eq!(parse_time("09:05"), 545);
        assert_eq!(parse_time("9:5"), 545);
        assert_eq!(parse_time(" 01:30 "), 90);
    }

    #[test]
    fn test_parse_time_clamps_components() {
        assert_eq!(parse_time("120:00"), 99 * 60);
        assert_eq!(parse_time("05:75"), 5 * 60 + 59);
    }

    #[test]
    fn test_parse_time_malformed_is_zero() {
        assert_eq!(parse_time(""), 0);
        assert_eq!(parse_time("1000"), 0);
        assert_eq!(parse_time("ab:cd"), 0);
        assert_eq!(parse_time("01:02:03"), 0);
        assert_eq!(parse_time(":30"), 0);
        assert_eq!(parse_time("-1:30"), 0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "-");
        assert_eq!(format_time(5), "00:05");
        assert_eq!(format_time(780), "13:00");
        // Derived values can run past 99 minutes
        assert_eq!(format_time(6179), "102:59");
    }

    #[test]
    fn test_zero_does_not_round_trip() {
        assert_eq!(format_time(parse_time("00:00")), "-");
        assert_eq!(parse_checkpoint_time("00:00"), None);
    }

    #[test]
    fn test_parse_checkpoint_time() {
        assert_eq!(parse_checkpoint_time("11:00"), Some(660));
        assert_eq!(parse_checkpoint_time(""), None);
        assert_eq!(parse_checkpoint_time("garbage"), None);
    }

    #[test]
    fn test_recorded_time_keeps_long_minutes() {
        assert_eq!(parse_recorded_time("102:59"), Some(6179));
        assert_eq!(parse_recorded_time("10:00"), Some(600));
        assert_eq!(parse_recorded_time("05:75"), Some(359));
        assert_eq!(parse_recorded_time("00:00"), None);
        assert_eq!(parse_recorded_time("-"), None);
        assert_eq!(parse_recorded_time("99999999:00"), None);
    }

    #[test]
    fn test_normalize_inserts_colon_after_two_digits() {
        assert_eq!(normalize_time_input("1"), "1");
        assert_eq!(normalize_time_input("12"), "12:");
        assert_eq!(normalize_time_input("12:3"), "12:3");
    }

    #[test]
    fn test_normalize_strips_and_clamps() {
        assert_eq!(normalize_time_input("1a2"), "12:");
        assert_eq!(normalize_time_input("150:10"), "99:10");
        assert_eq!(normalize_time_input("10:75"), "10:59");
        assert_eq!(normalize_time_input("10:20:30"), "10:20");
        assert_eq!(normalize_time_input("123"), "99:");
        assert_eq!(normalize_time_input(""), "");
    }

    #[test]
    fn test_finalize_pads_complete_values() {
        assert_eq!(finalize_time_input("9:5"), "09:05");
        assert_eq!(finalize_time_input("12:"), "12:");
        assert_eq!(finalize_time_input("7"), "7");
    }

    proptest! {
        #[test]
        fn prop_format_parse_round_trip(minutes in 0u32..=99, seconds in 0u32..=59) {
            prop_assume!(minutes + seconds > 0);
            let text = format!("{:02}:{:02}", minutes, seconds);
            prop_assert_eq!(format_time(parse_time(&text)), text);
        }

        #[test]
        fn prop_recorded_time_reads_back_formatted_seconds(seconds in 1u32..=100_000) {
            prop_assert_eq!(parse_recorded_time(&format_time(seconds)), Some(seconds));
        }

        #[test]
        fn prop_normalize_is_idempotent(raw in "[0-9:a-z ]{0,8}") {
            let once = normalize_time_input(&raw);
            prop_assert_eq!(normalize_time_input(&once), once.clone());
            let finalized = finalize_time_input(&raw);
            prop_assert_eq!(finalize_time_input(&finalized), finalized.clone());
        }

        #[test]
        fn prop_parse_never_exceeds_limits(raw in "[0-9]{1,4}:[0-9]{1,4}") {
            prop_assert!(parse_time(&raw) <= MAX_MINUTES * 60 + MAX_SECONDS);
        }
    }
}
