//! Parsing helpers for CLI string arguments

use anyhow::{Context, Result};

/// Parse a size string (e.g., "4k", "16M", "1g") to a count
///
/// Suffixes are binary multiples. A `0x` prefix is accepted for plain
/// numbers.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    if s.starts_with("0x") {
        return parse_u64(&s);
    }

    let (num_str, multiplier) = if s.ends_with("k") || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches("k"), 1024u64)
    } else if s.ends_with("m") || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches("m"), 1024 * 1024)
    } else if s.ends_with("g") || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches("g"), 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Size out of range: {}", s))
}

/// Parse a duration string (e.g., "10s", "2m", "1h") to seconds
pub fn parse_duration(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("sec") || s.ends_with("s") {
        (s.trim_end_matches("sec").trim_end_matches("s"), 1u64)
    } else if s.ends_with("min") || s.ends_with("m") {
        (s.trim_end_matches("min").trim_end_matches("m"), 60)
    } else if s.ends_with("hr") || s.ends_with("h") {
        (s.trim_end_matches("hr").trim_end_matches("h"), 3600)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Duration out of range: {}", s))
}

/// Parse a decimal or `0x`-prefixed hexadecimal `u64`
///
/// Underscores are ignored, so `1_000_000` and `0xdf5b_0412` are accepted.
pub fn parse_u64(s: &str) -> Result<u64> {
    let cleaned: String = s.trim().chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_lowercase();

    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
            .with_context(|| format!("Invalid hex value: {}", s))
    } else {
        lower.parse::<u64>()
            .with_context(|| format!("Invalid value: {}", s))
    }
}
