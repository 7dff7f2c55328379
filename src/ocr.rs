//! OCR engines that turn screenshot bytes into text.

use crate::error::{ChatlensError, Result};
use std::io::Write;
use std::process::Command;
use tracing::{debug, info};

/// Extracts text from an image.
///
/// `progress` receives values in `0..=100`; engines that cannot measure
/// progress report 0 at start and 100 on completion.
pub trait OcrEngine {
    /// # Errors
    ///
    /// Returns [`ChatlensError::OcrFailed`] when recognition cannot run.
    fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: &mut dyn FnMut(u8),
    ) -> Result<String>;
}

/// Shells out to a `tesseract`-compatible binary.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: &mut dyn FnMut(u8),
    ) -> Result<String> {
        progress(0);

        let mut file = tempfile::Builder::new()
            .prefix("chatlens-ocr-")
            .tempfile()?;
        file.write_all(image)?;
        file.flush()?;

        debug!(
            command = %self.command,
            language,
            path = %file.path().display(),
            "Running OCR"
        );

        let output = Command::new(&self.command)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .map_err(|e| {
                ChatlensError::ocr_failed(format!("could not run '{}': {e}", self.command))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChatlensError::ocr_failed(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        progress(100);
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        info!(chars = text.len(), "OCR complete");
        Ok(text)
    }
}

/// Returns a fixed string. Used for already-extracted text.
#[derive(Debug, Clone, Default)]
pub struct StaticText {
    text: String,
}

impl StaticText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrEngine for StaticText {
    fn recognize(
        &self,
        _image: &[u8],
        _language: &str,
        progress: &mut dyn FnMut(u8),
    ) -> Result<String> {
        progress(0);
        progress(100);
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_text_reports_full_progress() {
        let engine = StaticText::new("hello there");
        let mut seen = Vec::new();
        let text = engine.recognize(b"ignored", "eng", &mut |p| seen.push(p)).unwrap();
        assert_eq!(text, "hello there");
        assert_eq!(seen, vec![0, 100]);
    }

    #[test]
    fn missing_binary_is_ocr_failure() {
        let engine = TesseractCli::new("chatlens-definitely-not-installed");
        let err = engine
            .recognize(b"\x89PNG", "eng", &mut |_| {})
            .unwrap_err();
        assert!(matches!(err, ChatlensError::OcrFailed { .. }));
        assert!(err.to_string().contains("chatlens-definitely-not-installed"));
    }

    #[test]
    fn default_command_is_tesseract() {
        assert_eq!(TesseractCli::default().command(), "tesseract");
    }
}
