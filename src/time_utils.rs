// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time as RFC3339, the format all stored timestamps use.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Compact timestamp for file names, e.g. `20260827_134501`.
pub fn file_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}
