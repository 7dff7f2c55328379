//! CLI definitions for chatlens.
//!
//! Uses clap for argument parsing with derive macros.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// chatlens - conversation analytics for chat exports and screenshots
#[derive(Parser, Debug)]
#[command(name = "chatlens")]
#[command(version)]
#[command(about = "Analyze exported chat transcripts and chat screenshots")]
#[command(long_about = r#"
chatlens reads a JSON chat export (or a folder of message_N.json parts) and
reports who talks more, how fast each side replies, mood over time, top
words and emojis, streaks, highlights and monthly topics.

It can also OCR a chat screenshot and report tone, repeated phrases,
message structure and writing tips.

Quick start:
  1. Export a conversation as JSON from your messaging app
  2. Run: chatlens analyze /path/to/message_1.json --tips
  3. Keep it: chatlens analyze /path/to/export --save
"#)]
pub struct Cli {
    /// Path to the key-value store
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format (defaults to `output.format` from config)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Be verbose (show debug info)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Be quiet (suppress non-error output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a chat export file or export folder
    Analyze(AnalyzeArgs),

    /// Show a saved analysis
    Show(IdArgs),

    /// List saved analyses
    List,

    /// Delete a saved analysis
    Delete(IdArgs),

    /// OCR a chat screenshot and analyze its text
    Screenshot(ScreenshotArgs),

    /// Analyze already-extracted screenshot text
    Text(TextArgs),

    /// Compare two exports or saved analyses
    Compare(CompareArgs),

    /// Show or manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Export JSON file, or a folder holding message_N.json parts
    pub path: PathBuf,

    /// Store the result and print its id
    #[arg(long, short = 's')]
    pub save: bool,

    /// Append advice for your side of the chat
    #[arg(long, short = 't')]
    pub tips: bool,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    /// Saved analysis id (see `chatlens list`)
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ScreenshotArgs {
    /// JPEG, PNG or WebP screenshot
    pub image: PathBuf,

    /// OCR language code (defaults to `screenshot.language`)
    #[arg(long, short = 'l')]
    pub lang: Option<String>,

    /// OCR executable (defaults to `screenshot.ocr_command`)
    #[arg(long)]
    pub ocr_command: Option<String>,
}

#[derive(Args, Debug)]
pub struct TextArgs {
    /// Text file, or `-` for stdin
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// First export path or saved analysis id
    pub first: String,

    /// Second export path or saved analysis id
    pub second: String,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Set a configuration value (key=value)
    #[arg(long)]
    pub set: Option<String>,

    /// Write a default config file if none exists
    #[arg(long)]
    pub init: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    /// Resolve the flag against the configured default.
    #[must_use]
    pub fn resolve(flag: Option<Self>, configured: &str) -> Self {
        flag.or_else(|| Self::from_str(configured, true).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::parse_from(["chatlens", "analyze", "chat.json", "--save", "--tips", "-q"]);
        assert!(cli.quiet);
        match cli.command {
            Commands::Analyze(args) => {
                assert!(args.save);
                assert!(args.tips);
                assert_eq!(args.path, PathBuf::from("chat.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::parse_from(["chatlens", "list", "--format", "json-pretty"]);
        assert_eq!(cli.format, Some(OutputFormat::JsonPretty));
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(OutputFormat::resolve(None, "json"), OutputFormat::Json);
        assert_eq!(OutputFormat::resolve(None, "bogus"), OutputFormat::Text);
        assert_eq!(
            OutputFormat::resolve(Some(OutputFormat::Text), "json"),
            OutputFormat::Text
        );
    }
}
