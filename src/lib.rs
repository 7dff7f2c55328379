//! chatlens - conversation analytics for chat exports and screenshots
//!
//! This library turns a JSON chat export into per-participant statistics
//! (message balance, response times, interest, mood, streaks, highlights
//! and monthly topics) and analyzes OCR'd screenshot text for tone,
//! repeated phrases and writing tips.
//!
//! # Modules
//!
//! - [`parser`] - Export JSON parsing, including multi-part folders
//! - [`analysis`] - The chat analysis engine
//! - [`screenshot`] / [`ocr`] - Screenshot validation, OCR and text analysis
//! - [`text`], [`sentiment`], [`topics`], [`tone`], [`patterns`] - Text analyzers
//! - [`insights`] - Tips, mood labels and comparisons
//! - [`storage`] - `SQLite` key-value store for saved analyses
//! - [`render`] - Terminal reports
//! - [`cli`], [`config`], [`logging`], [`error`], [`perf`] - Plumbing

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod insights;
pub mod logging;
pub mod model;
pub mod ocr;
pub mod parser;
pub mod patterns;
pub mod perf;
pub mod render;
pub mod screenshot;
pub mod sentiment;
pub mod storage;
pub mod text;
pub mod tone;
pub mod topics;

pub use analysis::analyze_chat;
pub use cli::*;
pub use error::{
    ChatlensError, Result, ResultExt, VALID_CONFIG_KEYS, find_closest_match,
    format_did_you_mean, format_error, format_unknown_value_error,
};
pub use model::*;
pub use parser::ExportParser;
pub use screenshot::{analyze_screenshot, analyze_screenshot_text};
pub use storage::Storage;

use chrono::{DateTime, Datelike, Utc};

/// Default database filename
pub const DEFAULT_DB_NAME: &str = "chatlens.db";

/// Get the default data directory for chatlens
#[must_use]
pub fn default_data_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("chatlens")
}

/// Get the default database path
#[must_use]
pub fn default_db_path() -> std::path::PathBuf {
    default_data_dir().join(DEFAULT_DB_NAME)
}

/// Format an unsigned integer with thousands separators.
#[must_use]
pub fn format_number_u64(value: u64) -> String {
    let mut out = String::with_capacity(24);

    for (idx, ch) in value.to_string().chars().rev().enumerate() {
        if idx > 0 && idx % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

/// Format a datetime as a human-friendly relative string.
///
/// - < 1 minute: "just now"
/// - < 1 hour: "Nm ago"
/// - < 24 hours: "Nh ago"
/// - < 7 days: "Nd ago"
/// - Same calendar year: "Mon D"
/// - Different year: "Mon D, YYYY"
#[must_use]
pub fn format_relative_date(dt: DateTime<Utc>) -> String {
    format_relative_date_with_base(dt, Utc::now())
}

/// Format a datetime relative to a fixed base time.
#[must_use]
pub fn format_relative_date_with_base(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);

    if duration.num_seconds() < 0 {
        return dt.format("%b %d, %Y").to_string();
    }

    let minutes = duration.num_minutes();
    let hours = duration.num_hours();
    let days = duration.num_days();

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else if dt.year() == now.year() {
        dt.format("%b %d").to_string()
    } else {
        dt.format("%b %d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{default_db_path, format_number_u64, format_relative_date_with_base};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn format_number_adds_separators() {
        assert_eq!(format_number_u64(0), "0");
        assert_eq!(format_number_u64(999), "999");
        assert_eq!(format_number_u64(1000), "1,000");
        assert_eq!(format_number_u64(12_345_678), "12,345,678");
    }

    #[test]
    fn format_relative_date_thresholds() {
        let base = Utc
            .with_ymd_and_hms(2025, 1, 10, 12, 0, 0)
            .single()
            .unwrap();

        assert_eq!(
            format_relative_date_with_base(base - Duration::seconds(30), base),
            "just now"
        );
        assert_eq!(
            format_relative_date_with_base(base - Duration::minutes(5), base),
            "5m ago"
        );
        assert_eq!(
            format_relative_date_with_base(base - Duration::hours(3), base),
            "3h ago"
        );
        assert_eq!(
            format_relative_date_with_base(base - Duration::days(2), base),
            "2d ago"
        );

        let same_year = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap();
        assert_eq!(format_relative_date_with_base(same_year, base), "Jan 01");

        let different_year = Utc
            .with_ymd_and_hms(2024, 12, 11, 0, 0, 0)
            .single()
            .unwrap();
        assert_eq!(
            format_relative_date_with_base(different_year, base),
            "Dec 11, 2024"
        );
    }

    #[test]
    fn default_db_lives_under_chatlens_dir() {
        let path = default_db_path();
        assert!(path.ends_with("chatlens/chatlens.db"));
    }
}
