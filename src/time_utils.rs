// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date/time formatting for console output.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Coarse "time left" label, e.g. `4m 05s` or `expired`.
pub fn remaining_label(until: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (until - now).num_seconds();
    if secs <= 0 {
        return "expired".to_string();
    }
    match (secs / 3600, (secs % 3600) / 60, secs % 60) {
        (0, 0, s) => format!("{}s", s),
        (0, m, s) => format!("{}m {:02}s", m, s),
        (h, m, _) => format!("{}h {:02}m", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_utc_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 7, 30, 0).unwrap();
        assert_eq!(format_utc_rfc3339(ts), "2026-03-14T07:30:00Z");
    }

    #[test]
    fn test_remaining_label() {
        let now = Utc::now();
        assert_eq!(remaining_label(now - Duration::seconds(5), now), "expired");
        assert_eq!(remaining_label(now + Duration::seconds(42), now), "42s");
        assert_eq!(remaining_label(now + Duration::seconds(245), now), "4m 05s");
        assert_eq!(remaining_label(now + Duration::seconds(7260), now), "2h 01m");
    }
}
