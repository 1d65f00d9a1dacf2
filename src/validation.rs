//! Centralized validation functions for iocsync.
//!
//! This module provides unified validation for:
//! - IPv4 indicator values
//! - Trailing collection windows (e.g. "30d")

use anyhow::{bail, Result};
use chrono::Duration;
use std::net::Ipv4Addr;

use crate::error::IocsyncError;

/// Validate an IPv4 indicator string and return the parsed address.
///
/// Uses strict dotted-quad semantics: four octets, each 0-255, no leading
/// zeros, no CIDR suffix.
///
/// # Examples
/// ```
/// use iocsync::validation::validate_ipv4;
/// assert!(validate_ipv4("10.0.0.1").is_ok());
/// assert!(validate_ipv4("10.0.0.999").is_err());
/// assert!(validate_ipv4("not-an-ip").is_err());
/// ```
pub fn validate_ipv4(value: &str) -> Result<Ipv4Addr> {
    value
        .parse()
        .map_err(|_| IocsyncError::InvalidIndicator(value.to_string()).into())
}

/// Returns `true` if the candidate is a well-formed IPv4 dotted-quad.
pub fn is_valid_ipv4(value: &str) -> bool {
    value.parse::<Ipv4Addr>().is_ok()
}

/// Validate a trailing window specification (e.g. "30d", "12h").
///
/// Requires ASCII-only input with a lowercase unit suffix. Capitalized or
/// unknown units are rejected at config load rather than surfacing as a
/// request-time failure.
///
/// Valid suffixes: `s` (seconds), `m` (minutes), `h` (hours), `d` (days)
///
/// # Examples
/// ```
/// use iocsync::validation::validate_window;
/// assert!(validate_window("30d").is_ok());
/// assert!(validate_window("30D").is_err());
/// assert!(validate_window("").is_err());
/// ```
pub fn validate_window(window: &str) -> Result<()> {
    if window.is_empty() {
        bail!("Window cannot be empty");
    }

    // Reject non-ASCII to prevent Unicode edge cases
    if !window.is_ascii() {
        bail!("Invalid window '{}'. Only ASCII characters allowed", window);
    }

    if window.len() < 2 {
        bail!("Invalid window '{}'. Use format like '30d', '12h'", window);
    }

    // Safe to use chars() since we verified ASCII-only
    let suffix = window.chars().last().unwrap();
    let num_part = &window[..window.len() - 1];

    if !matches!(suffix, 's' | 'm' | 'h' | 'd') {
        bail!("Invalid window '{}'. Suffix must be s, m, h, or d", window);
    }

    if num_part.parse::<u32>().is_err() {
        bail!(
            "Invalid window '{}'. Number part must be a positive integer",
            window
        );
    }

    Ok(())
}

/// Convert a validated window specification into a duration.
pub fn window_duration(window: &str) -> Result<Duration> {
    validate_window(window)?;

    let suffix = window.chars().last().unwrap();
    let amount: i64 = window[..window.len() - 1].parse::<u32>().unwrap().into();

    Ok(match suffix {
        's' => Duration::seconds(amount),
        'm' => Duration::minutes(amount),
        'h' => Duration::hours(amount),
        _ => Duration::days(amount),
    })
}
