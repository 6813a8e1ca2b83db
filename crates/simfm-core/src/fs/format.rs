//! Display helpers for sizes and timestamps.

use std::time::SystemTime;

use chrono::{DateTime, Local};
use humansize::{format_size as humanize, BINARY};

/// Date pattern used when the caller has no preference.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a byte count with binary units (`1 KiB` = 1024 bytes).
pub fn format_size(bytes: u64) -> String {
    humanize(bytes, BINARY)
}

/// Formats `time` in local time using a `chrono` strftime pattern.
pub fn format_date(time: SystemTime, pattern: &str) -> String {
    let dt: DateTime<Local> = DateTime::from(time);
    dt.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn small_sizes_are_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert!(format_size(512).ends_with(" B"));
    }

    #[test]
    fn sizes_use_binary_units() {
        assert!(format_size(1024).contains("KiB"));
        assert!(format_size(5 * 1024 * 1024).contains("MiB"));
    }

    #[test]
    fn date_uses_pattern() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400 * 365);
        let formatted = format_date(t, DEFAULT_DATE_FORMAT);
        assert_eq!(formatted.len(), 10);
        assert!(formatted.starts_with("1970") || formatted.starts_with("1971"));
    }
}
