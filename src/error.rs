//! Custom error types for chatlens.
//!
//! Errors are grouped the same way they surface to the user: bad input,
//! failed text extraction, optional sub-analyses that degrade instead of
//! failing, and the storage/IO/config plumbing around the engine.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for chatlens operations.
#[derive(Error, Debug)]
pub enum ChatlensError {
    // =========================================================================
    // Input Format Errors
    // =========================================================================
    /// Export is not valid JSON or does not have the expected shape.
    #[error("Invalid export format: {reason}")]
    InvalidExport { reason: String },

    /// Export file exceeds the configured size limit.
    #[error("Export is too large ({size} bytes, limit is {limit} bytes)")]
    ExportTooLarge { size: u64, limit: u64 },

    /// Uploaded image is not a JPEG, PNG or WebP file.
    #[error("Unsupported image type ({detected}). Please use a JPG, PNG, or WebP image")]
    UnsupportedImage { detected: String },

    /// Uploaded image exceeds the configured size limit.
    #[error("Image is too large ({size} bytes, limit is {limit} bytes)")]
    ImageTooLarge { size: u64, limit: u64 },

    // =========================================================================
    // Extraction Errors
    // =========================================================================
    /// OCR produced nothing but whitespace.
    #[error("No text could be extracted from this image")]
    NoTextExtracted,

    /// The OCR engine itself failed.
    #[error("OCR failed: {reason}")]
    OcrFailed { reason: String },

    // =========================================================================
    // Optional Sub-analysis Errors
    // =========================================================================
    /// Tone could not be classified for the given text.
    #[error("Tone analysis unavailable: {reason}")]
    ToneUnavailable { reason: String },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// No stored analysis under this id.
    #[error("Analysis '{id}' not found")]
    AnalysisNotFound { id: String },

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Stored value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    /// File read/write error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Path-specific IO error with context.
    #[error("Failed to {operation} '{path}': {source}")]
    PathError {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Configuration / CLI Errors
    // =========================================================================
    /// Configuration file parsing error.
    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigError { path: PathBuf, reason: String },

    /// Invalid command-line argument.
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Catch-all for other errors with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for chatlens operations.
pub type Result<T> = std::result::Result<T, ChatlensError>;

impl ChatlensError {
    /// Create an invalid export error.
    pub fn invalid_export(reason: impl Into<String>) -> Self {
        Self::InvalidExport {
            reason: reason.into(),
        }
    }

    /// Create an OCR failure error.
    pub fn ocr_failed(reason: impl Into<String>) -> Self {
        Self::OcrFailed {
            reason: reason.into(),
        }
    }

    /// Create a tone-unavailable error.
    pub fn tone_unavailable(reason: impl Into<String>) -> Self {
        Self::ToneUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an analysis-not-found error.
    pub fn analysis_not_found(id: impl Into<String>) -> Self {
        Self::AnalysisNotFound { id: id.into() }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a path error with context.
    pub fn path_error(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::PathError {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Wrap an error with additional context.
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Check if this error is recoverable (user can fix it).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidExport { .. }
                | Self::ExportTooLarge { .. }
                | Self::UnsupportedImage { .. }
                | Self::ImageTooLarge { .. }
                | Self::NoTextExtracted
                | Self::AnalysisNotFound { .. }
                | Self::InvalidArgument { .. }
        )
    }

    /// Get a suggestion for how to fix this error, if applicable.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidExport { .. } => {
                Some("Please ensure you are uploading a JSON chat export file.")
            }
            Self::ExportTooLarge { .. } => {
                Some("Raise analysis.max_export_mb or analyze a single message_N.json part.")
            }
            Self::UnsupportedImage { .. } | Self::ImageTooLarge { .. } => {
                Some("Upload a JPG, PNG, or WebP screenshot under the size limit.")
            }
            Self::NoTextExtracted => Some("Please try a clearer screenshot."),
            Self::OcrFailed { .. } => {
                Some("Check that the OCR command is installed (see 'chatlens config --show').")
            }
            Self::AnalysisNotFound { .. } => {
                Some("Run 'chatlens list' to see stored analyses.")
            }
            _ => None,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with additional context.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with additional context.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ChatlensError::with_context(context, e))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ChatlensError::with_context(f(), e))
    }
}

// =============================================================================
// CLI Error Formatting Utilities
// =============================================================================

use colored::Colorize;

/// Format a structured CLI error with explanation and suggestions.
#[must_use]
pub fn format_error(title: &str, explanation: &str, suggestions: &[&str]) -> String {
    use std::fmt::Write;

    let mut output = format!("{} {}", "✗".red().bold(), title.bold());

    if !explanation.is_empty() {
        let _ = write!(output, "\n\n   {explanation}");
    }

    if !suggestions.is_empty() {
        output.push_str("\n\n   ");
        if suggestions.len() == 1 {
            let _ = write!(output, "{} {}", "Hint:".cyan(), suggestions[0]);
        } else {
            let _ = write!(output, "{}:", "Try".cyan());
            for suggestion in suggestions {
                let _ = write!(output, "\n     {} {}", "•".dimmed(), suggestion);
            }
        }
    }

    output
}

/// Calculate the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();

    if a_chars.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a_chars.len();
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Find the closest candidate within `max_distance` edits (default 2).
///
/// Exact matches are not returned; there is nothing to suggest.
#[must_use]
pub fn find_closest_match<'a>(
    input: &str,
    candidates: &[&'a str],
    max_distance: Option<usize>,
) -> Option<&'a str> {
    let max_dist = max_distance.unwrap_or(2);
    let input_lower = input.to_lowercase();

    candidates
        .iter()
        .map(|&candidate| {
            let distance = levenshtein_distance(&input_lower, &candidate.to_lowercase());
            (candidate, distance)
        })
        .filter(|(_, distance)| *distance <= max_dist && *distance > 0)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Format a "did you mean?" suggestion.
#[must_use]
pub fn format_did_you_mean(suggestion: &str) -> String {
    format!("Did you mean '{}'?", suggestion.green())
}

/// Format an error for an unknown value with "did you mean?" support.
#[must_use]
pub fn format_unknown_value_error(kind: &str, input: &str, valid_options: &[&str]) -> String {
    let title = format!("Unknown {kind}: '{input}'");

    let mut suggestions = Vec::new();

    if let Some(closest) = find_closest_match(input, valid_options, None) {
        suggestions.push(format_did_you_mean(closest));
    }

    if valid_options.len() <= 12 {
        suggestions.push(format!("Valid {kind}s: {}", valid_options.join(", ")));
    }

    let suggestion_refs: Vec<&str> = suggestions.iter().map(String::as_str).collect();
    format_error(&title, "", &suggestion_refs)
}

/// Config keys accepted by `chatlens config --set`.
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "paths.db",
    "analysis.max_export_mb",
    "analysis.top_words",
    "analysis.top_emojis",
    "screenshot.max_image_mb",
    "screenshot.language",
    "screenshot.ocr_command",
    "features.premium",
    "output.format",
    "output.colors",
    "output.quiet",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_export_display() {
        let err = ChatlensError::invalid_export("expected value at line 1 column 1");
        assert!(err.to_string().starts_with("Invalid export format"));
        assert!(err.is_recoverable());
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_no_text_extracted_is_recoverable() {
        let err = ChatlensError::NoTextExtracted;
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "No text could be extracted from this image"
        );
    }

    #[test]
    fn test_not_found_mentions_id() {
        let err = ChatlensError::analysis_not_found("abc123");
        assert!(err.to_string().contains("abc123"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ChatlensError = io_err.into();
        assert!(matches!(err, ChatlensError::IoError(_)));
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ChatlensError = serde_err.into();
        assert!(matches!(err, ChatlensError::SerializationError(_)));
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein_distance("hello", "hello"), 0);
        assert_eq!(levenshtein_distance("cat", "cats"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn find_closest_config_key() {
        assert_eq!(
            find_closest_match("features.premiun", VALID_CONFIG_KEYS, None),
            Some("features.premium")
        );
        assert_eq!(find_closest_match("paths.db", VALID_CONFIG_KEYS, None), None);
        assert_eq!(find_closest_match("nonsense", VALID_CONFIG_KEYS, None), None);
    }

    #[test]
    fn format_unknown_value_lists_suggestion() {
        let output = format_unknown_value_error("config key", "output.colour", VALID_CONFIG_KEYS);
        assert!(output.contains("Unknown config key"));
        assert!(output.contains("output.colors"));
    }
}
