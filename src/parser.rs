//! Chat export parser.
//!
//! Exports are JSON objects with `participants` and `messages` arrays. Large
//! conversations are split by the exporting service into `message_1.json`,
//! `message_2.json`, ... inside one folder; [`ExportParser::parse_dir`]
//! stitches those parts back together.

use crate::error::{ChatlensError, Result, ResultExt};
use crate::model::ChatExport;
use crate::perf::{PARSE_EXPORT, Timer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Default cap on a single export file.
pub const DEFAULT_MAX_EXPORT_BYTES: u64 = 50 * 1024 * 1024;

/// Parser for JSON chat exports.
#[derive(Debug, Clone)]
pub struct ExportParser {
    max_bytes: u64,
}

impl Default for ExportParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXPORT_BYTES)
    }
}

impl ExportParser {
    #[must_use]
    pub const fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Parse export JSON from a string.
    ///
    /// # Errors
    ///
    /// [`ChatlensError::InvalidExport`] for malformed JSON, a non-object
    /// document, missing `participants`/`messages` arrays, or messages that
    /// lack `sender_name`/`timestamp_ms`.
    pub fn parse_str(&self, text: &str) -> Result<ChatExport> {
        let timer = Timer::start(PARSE_EXPORT);

        let value: Value = serde_json::from_str(text)
            .map_err(|e| ChatlensError::invalid_export(format!("not valid JSON ({e})")))?;

        let Some(object) = value.as_object() else {
            return Err(ChatlensError::invalid_export("expected a JSON object"));
        };
        for field in ["participants", "messages"] {
            if !object.get(field).is_some_and(Value::is_array) {
                return Err(ChatlensError::invalid_export(format!("missing '{field}' array")));
            }
        }

        let export: ChatExport = serde_json::from_value(value)
            .map_err(|e| ChatlensError::invalid_export(e.to_string()))?;

        timer.stop();
        debug!(
            participants = export.participants.len(),
            messages = export.messages.len(),
            "Parsed export"
        );
        Ok(export)
    }

    /// Read and parse one export file, enforcing the size cap.
    ///
    /// # Errors
    ///
    /// IO errors, [`ChatlensError::ExportTooLarge`], or parse errors.
    pub fn parse_file(&self, path: &Path) -> Result<ChatExport> {
        let size = std::fs::metadata(path)
            .map_err(|e| ChatlensError::path_error("read", path, e))?
            .len();
        if size > self.max_bytes {
            return Err(ChatlensError::ExportTooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| ChatlensError::path_error("read", path, e))?;
        let export = self.parse_str(&text)?;
        info!(
            path = %path.display(),
            messages = export.messages.len(),
            "Loaded export"
        );
        Ok(export)
    }

    /// Parse every `message_<n>.json` part in `dir` and merge them.
    ///
    /// Participants and metadata come from the lowest-numbered part; messages
    /// are concatenated in part order. Sorting is left to the analysis engine.
    ///
    /// # Errors
    ///
    /// [`ChatlensError::InvalidExport`] if the folder holds no parts, or any
    /// error from [`Self::parse_file`].
    pub fn parse_dir(&self, dir: &Path) -> Result<ChatExport> {
        let parts = find_parts(dir)?;
        if parts.is_empty() {
            return Err(ChatlensError::invalid_export(format!(
                "no message_N.json parts found in {}",
                dir.display()
            )));
        }

        let mut merged: Option<ChatExport> = None;
        for (number, path) in &parts {
            let part = self.parse_file(path)?;
            debug!(part = number, messages = part.messages.len(), "Merging export part");
            match merged.as_mut() {
                Some(export) => export.messages.extend(part.messages),
                None => merged = Some(part),
            }
        }

        let export = merged.unwrap_or_default();
        info!(
            parts = parts.len(),
            messages = export.messages.len(),
            "Merged multi-part export"
        );
        Ok(export)
    }

    /// Parse a file, or a folder of parts.
    ///
    /// # Errors
    ///
    /// See [`Self::parse_file`] and [`Self::parse_dir`].
    pub fn parse_path(&self, path: &Path) -> Result<ChatExport> {
        if path.is_dir() {
            self.parse_dir(path)
        } else {
            self.parse_file(path)
        }
    }
}

/// `message_<n>.json` files directly inside `dir`, ordered by `n`.
fn find_parts(dir: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let mut parts = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.context(format!("Failed to list {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(number) = entry.file_name().to_str().and_then(part_number) {
            parts.push((number, entry.into_path()));
        }
    }

    parts.sort_by_key(|(number, _)| *number);
    Ok(parts)
}

fn part_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("message_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXPORT: &str = r#"{
        "participants": [{"name": "alice"}, {"name": "bob"}],
        "messages": [
            {"sender_name": "bob", "timestamp_ms": 1700000060000, "content": "hey"},
            {"sender_name": "alice", "timestamp_ms": 1700000000000, "content": "hi",
             "reactions": [{"reaction": "❤️", "actor": "bob"}]}
        ],
        "title": "alice",
        "is_still_participant": true
    }"#;

    #[test]
    fn parses_export_with_metadata() {
        let export = ExportParser::default().parse_str(EXPORT).unwrap();
        assert_eq!(export.participants.len(), 2);
        assert_eq!(export.messages.len(), 2);
        assert_eq!(export.title.as_deref(), Some("alice"));
        assert_eq!(export.is_still_participant, Some(true));
        assert!(export.thread_path.is_none());
        let reactions = export.messages[1].reactions.as_ref().unwrap();
        assert_eq!(reactions[0].reaction, "❤️");
        assert!(reactions[0].timestamp.is_none());
    }

    #[test]
    fn malformed_json_is_invalid_export() {
        let err = ExportParser::default().parse_str("{not json").unwrap_err();
        assert!(matches!(err, ChatlensError::InvalidExport { .. }));
        assert!(err.to_string().starts_with("Invalid export format"));
    }

    #[test]
    fn wrong_shape_is_invalid_export() {
        let parser = ExportParser::default();
        for input in [
            "[]",
            r#"{"messages": []}"#,
            r#"{"participants": [], "messages": {}}"#,
            r#"{"participants": [], "messages": [{"content": "no sender"}]}"#,
        ] {
            assert!(
                matches!(parser.parse_str(input), Err(ChatlensError::InvalidExport { .. })),
                "accepted {input}"
            );
        }
    }

    #[test]
    fn file_size_cap_is_enforced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("message_1.json");
        std::fs::write(&path, EXPORT).unwrap();

        let err = ExportParser::new(10).parse_file(&path).unwrap_err();
        assert!(matches!(err, ChatlensError::ExportTooLarge { limit: 10, .. }));
        assert!(ExportParser::default().parse_file(&path).is_ok());
    }

    #[test]
    fn merges_numbered_parts_in_order() {
        let dir = TempDir::new().unwrap();
        let second = r#"{"participants": [{"name": "zed"}], "title": "other",
            "messages": [{"sender_name": "alice", "timestamp_ms": 1}]}"#;
        std::fs::write(dir.path().join("message_2.json"), second).unwrap();
        std::fs::write(dir.path().join("message_1.json"), EXPORT).unwrap();
        std::fs::write(dir.path().join("notes.json"), "ignored").unwrap();

        let export = ExportParser::default().parse_path(dir.path()).unwrap();
        assert_eq!(export.messages.len(), 3);
        assert_eq!(export.title.as_deref(), Some("alice"));
        assert_eq!(export.participants[0].name, "alice");
        assert_eq!(export.messages[2].timestamp_ms, 1);
    }

    #[test]
    fn empty_dir_is_invalid_export() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ExportParser::default().parse_dir(dir.path()),
            Err(ChatlensError::InvalidExport { .. })
        ));
    }

    #[test]
    fn part_numbers() {
        assert_eq!(part_number("message_1.json"), Some(1));
        assert_eq!(part_number("message_12.json"), Some(12));
        assert_eq!(part_number("message_x.json"), None);
        assert_eq!(part_number("messages.json"), None);
    }
}
