//! chatlens - conversation analytics CLI
//!
//! Main entry point for the chatlens command-line tool.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

use chatlens::cli::{self, Cli, Commands, OutputFormat};
use chatlens::config::Config;
use chatlens::insights::{ChatTip, chat_tips, compare};
use chatlens::logging::{OperationGuard, init_cli_logging};
use chatlens::model::{AnalysisResult, ChatExport};
use chatlens::ocr::TesseractCli;
use chatlens::render::{self, ReportOptions};
use chatlens::screenshot::read_image;
use chatlens::{
    ChatlensError, ExportParser, Storage, VALID_CONFIG_KEYS, analyze_chat, analyze_screenshot,
    analyze_screenshot_text, format_unknown_value_error,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load();

    let quiet = cli.quiet || config.output.quiet;
    init_cli_logging(quiet, cli.verbose, config.output.colors);
    if !config.output.colors {
        colored::control::set_override(false);
    }

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Analyze(args) => cmd_analyze(cli, config, args),
        Commands::Show(args) => cmd_show(cli, config, args),
        Commands::List => cmd_list(cli, config),
        Commands::Delete(args) => cmd_delete(cli, config, args),
        Commands::Screenshot(args) => cmd_screenshot(cli, config, args),
        Commands::Text(args) => cmd_text(cli, config, args),
        Commands::Compare(args) => cmd_compare(cli, config, args),
        Commands::Config(args) => cmd_config(cli, config, args),
        Commands::Completions(args) => cmd_completions(args),
    }
}

fn report_error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "Error:".red().bold());
    let known = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ChatlensError>());
    if let Some(hint) = known.and_then(ChatlensError::suggestion) {
        eprintln!("  {} {hint}", "hint:".yellow());
    }
    if !known.is_some_and(ChatlensError::is_recoverable) {
        eprintln!("  {} rerun with --verbose for details", "note:".dimmed());
    }
}

fn output_format(cli: &Cli, config: &Config) -> OutputFormat {
    OutputFormat::resolve(cli.format, &config.output.format)
}

fn is_quiet(cli: &Cli, config: &Config) -> bool {
    cli.quiet || config.output.quiet
}

fn get_db_path(cli: &Cli, config: &Config) -> PathBuf {
    cli.db.clone().unwrap_or_else(|| config.db_path())
}

fn open_storage(cli: &Cli, config: &Config) -> Result<Storage> {
    let path = get_db_path(cli, config);
    debug!(path = %path.display(), "Opening store");
    Ok(Storage::open(&path)?)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

/// Emit `value` as JSON, or run `text` for the terminal report.
fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(value, false),
        OutputFormat::JsonPretty => print_json(value, true),
        OutputFormat::Text => {
            print!("{}", text());
            Ok(())
        }
    }
}

/// JSON shape of `analyze`: the analysis fields plus optional extras.
#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(flatten)]
    analysis: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    tips: Option<&'a [ChatTip]>,
}

fn load_export(config: &Config, path: &Path) -> Result<ChatExport> {
    let parser = ExportParser::new(config.max_export_bytes());
    parser
        .parse_path(path)
        .with_context(|| format!("Failed to load export {}", path.display()))
}

fn cmd_analyze(cli: &Cli, config: &Config, args: &cli::AnalyzeArgs) -> Result<()> {
    let guard = OperationGuard::new("analyze");
    let export = match load_export(config, &args.path) {
        Ok(export) => export,
        Err(err) => {
            guard.fail(&*err);
            return Err(err);
        }
    };

    let analysis = analyze_chat(&export);
    let options = ReportOptions::from(config);
    let tips = (args.tips && options.premium).then(|| chat_tips(&analysis));

    let id = if args.save {
        Some(open_storage(cli, config)?.save_analysis(&analysis)?)
    } else {
        None
    };
    guard.complete();

    let output = AnalyzeOutput {
        id: id.as_deref(),
        analysis: &analysis,
        tips: tips.as_deref(),
    };
    emit(output_format(cli, config), &output, || {
        let mut text = render::render_analysis(&analysis, &options);
        if args.tips {
            text.push_str(&render::render_tips(tips.as_deref().unwrap_or_default(), &options));
        }
        if let Some(id) = &id {
            text.push_str(&format!("\n{} Saved as {}\n", "✓".green(), id.bold()));
        }
        text
    })
}

fn cmd_show(cli: &Cli, config: &Config, args: &cli::IdArgs) -> Result<()> {
    let storage = open_storage(cli, config)?;
    let analysis = storage.load_analysis(&args.id)?;
    let options = ReportOptions::from(config);
    emit(output_format(cli, config), &analysis, || {
        render::render_analysis(&analysis, &options)
    })
}

fn cmd_list(cli: &Cli, config: &Config) -> Result<()> {
    let summaries = open_storage(cli, config)?.list_analyses()?;
    emit(output_format(cli, config), &summaries, || {
        render::render_saved_list(&summaries)
    })
}

fn cmd_delete(cli: &Cli, config: &Config, args: &cli::IdArgs) -> Result<()> {
    open_storage(cli, config)?.delete_analysis(&args.id)?;
    info!(id = %args.id, "Deleted analysis");
    if !is_quiet(cli, config) {
        println!("{} Deleted {}", "✓".green(), args.id.bold());
    }
    Ok(())
}

fn ocr_progress(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} OCR {bar:40.cyan/blue} {pos:>3}%")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

fn cmd_screenshot(cli: &Cli, config: &Config, args: &cli::ScreenshotArgs) -> Result<()> {
    let guard = OperationGuard::new("screenshot");
    let image = match read_image(&args.image, config.max_image_bytes()) {
        Ok(image) => image,
        Err(err) => {
            guard.fail(&err);
            return Err(err.into());
        }
    };

    let engine = TesseractCli::new(
        args.ocr_command
            .clone()
            .unwrap_or_else(|| config.screenshot.ocr_command.clone()),
    );
    let language = args.lang.as_deref().unwrap_or(&config.screenshot.language);
    let format = output_format(cli, config);

    let pb = ocr_progress(is_quiet(cli, config) || format != OutputFormat::Text);
    let result = analyze_screenshot(
        &image,
        &engine,
        language,
        config.max_image_bytes(),
        &mut |pct: u8| pb.set_position(u64::from(pct)),
    );
    pb.finish_and_clear();

    let analysis = match result {
        Ok(analysis) => analysis,
        Err(err) => {
            guard.fail(&err);
            return Err(err.into());
        }
    };
    guard.complete();

    let options = ReportOptions::from(config);
    emit(format, &analysis, || render::render_screenshot(&analysis, &options))
}

fn cmd_text(cli: &Cli, config: &Config, args: &cli::TextArgs) -> Result<()> {
    let text = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read text from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| ChatlensError::path_error("read", &args.input, e))?
    };

    let analysis = analyze_screenshot_text(&text)?;
    let options = ReportOptions::from(config);
    emit(output_format(cli, config), &analysis, || {
        render::render_screenshot(&analysis, &options)
    })
}

/// An existing path is analyzed fresh; anything else is a saved id.
fn resolve_analysis(
    cli: &Cli,
    config: &Config,
    storage: &mut Option<Storage>,
    target: &str,
) -> Result<AnalysisResult> {
    let path = Path::new(target);
    if path.exists() {
        return Ok(analyze_chat(&load_export(config, path)?));
    }
    let store = match storage.take() {
        Some(store) => store,
        None => open_storage(cli, config)?,
    };
    let loaded = store.load_analysis(target);
    *storage = Some(store);
    Ok(loaded?)
}

fn cmd_compare(cli: &Cli, config: &Config, args: &cli::CompareArgs) -> Result<()> {
    let mut storage = None;
    let first = resolve_analysis(cli, config, &mut storage, &args.first)?;
    let second = resolve_analysis(cli, config, &mut storage, &args.second)?;
    let comparison = compare(&first, &second);
    emit(output_format(cli, config), &comparison, || {
        render::render_comparison(&comparison)
    })
}

fn cmd_config(cli: &Cli, config: &Config, args: &cli::ConfigArgs) -> Result<()> {
    if args.init {
        return config_init();
    }
    if let Some(assignment) = &args.set {
        return config_set(assignment);
    }

    match output_format(cli, config) {
        OutputFormat::Json => print_json(config, false),
        OutputFormat::JsonPretty => print_json(config, true),
        OutputFormat::Text => {
            println!("{}", "Current Configuration".bold().cyan());
            let file = Config::user_config_path()
                .map_or_else(|| "unavailable".to_string(), |p| p.display().to_string());
            println!("  Config file: {file}");
            println!("  Database: {}", get_db_path(cli, config).display());
            println!();
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
    }
}

fn config_init() -> Result<()> {
    let path = Config::user_config_path().context("Could not determine config directory")?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    Config::default().save_to(&path)?;
    println!("{} Wrote default config to {}", "✓".green(), path.display());
    Ok(())
}

fn config_set(assignment: &str) -> Result<()> {
    let (key, value) = assignment.split_once('=').ok_or_else(|| {
        ChatlensError::invalid_argument(format!("expected key=value, got '{assignment}'"))
    })?;
    let key = key.trim();
    if !VALID_CONFIG_KEYS.contains(&key) {
        anyhow::bail!(format_unknown_value_error("config key", key, VALID_CONFIG_KEYS));
    }

    let mut file_config = Config::user_config_path()
        .and_then(|p| Config::load_from_file(&p))
        .unwrap_or_default();
    file_config.set_value(key, value.trim())?;
    let path = file_config.save()?;
    println!(
        "{} Set {} = {} in {}",
        "✓".green(),
        key.bold(),
        value.trim(),
        path.display()
    );
    Ok(())
}

fn cmd_completions(args: &cli::CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "chatlens", &mut io::stdout());
    Ok(())
}
