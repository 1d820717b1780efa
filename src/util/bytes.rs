//! Utility helpers for parsing and formatting byte counts.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid byte size `{input}`: {reason}")]
pub struct ParseBytesError {
    input: String,
    reason: &'static str,
}

impl ParseBytesError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// Parse a human-readable size such as `1mb`, `512kb`, or `1048576` into bytes.
///
/// Units are binary (1kb == 1024 bytes) and case-insensitive; a bare number is
/// taken as bytes. Fractional values like `1.5mb` are accepted.
pub fn parse_bytes(input: &str) -> Result<u64, ParseBytesError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseBytesError::new(input, "empty value"));
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| ParseBytesError::new(input, "expected a number"))?;
    if value < 0.0 || !value.is_finite() {
        return Err(ParseBytesError::new(input, "expected a non-negative number"));
    }

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "kb" | "kib" => 1024,
        "mb" | "mib" => 1024 * 1024,
        "gb" | "gib" => 1024 * 1024 * 1024,
        "tb" | "tib" => 1024 * 1024 * 1024 * 1024,
        _ => return Err(ParseBytesError::new(input, "unknown unit")),
    };

    Ok((value * multiplier as f64).floor() as u64)
}

/// Format a byte count into IEC units (KiB, MiB, GiB, TiB) with trimmed precision.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit_index = 0;

    while value >= 1024.0 && unit_index < UNITS.len() - 1 {
        value /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        return format!("{bytes} {}", UNITS[unit_index]);
    }

    let mut value_str = if value >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    };

    if value_str.contains('.') {
        while value_str.ends_with('0') {
            value_str.pop();
        }
        if value_str.ends_with('.') {
            value_str.pop();
        }
    }

    format!("{value_str} {}", UNITS[unit_index])
}

#[cfg(test)]
mod tests {
    use super::{format_bytes, parse_bytes};

    #[test]
    fn parse_bytes_handles_units() {
        assert_eq!(parse_bytes("1048576"), Ok(1024 * 1024));
        assert_eq!(parse_bytes("1b"), Ok(1));
        assert_eq!(parse_bytes("512kb"), Ok(512 * 1024));
        assert_eq!(parse_bytes("1mb"), Ok(1024 * 1024));
        assert_eq!(parse_bytes("1MB"), Ok(1024 * 1024));
        assert_eq!(parse_bytes(" 2gb "), Ok(2 * 1024 * 1024 * 1024));
        assert_eq!(parse_bytes("1.5kb"), Ok(1536));
    }

    #[test]
    fn parse_bytes_rejects_garbage() {
        assert!(parse_bytes("").is_err());
        assert!(parse_bytes("mb").is_err());
        assert!(parse_bytes("10 lightyears").is_err());
        assert!(parse_bytes("-1kb").is_err());
    }

    #[test]
    fn format_bytes_scales_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1 KiB");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(1024 * 1024), "1 MiB");
    }
}
