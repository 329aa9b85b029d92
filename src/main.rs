//! Callout Sync - Entry Point

use callout_sync::config::{self, ResolvedConfig};
use callout_sync::host::{FileEditor, MemorySurface};
use callout_sync::model::error::AppError;
use callout_sync::model::{Mode, Scope};
use callout_sync::{outline, parser, state};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Collapse, expand or toggle callouts in a Markdown file
#[derive(Parser, Debug)]
#[command(name = "callout-sync")]
#[command(version)]
#[command(about = "Collapse, expand or toggle Obsidian-style callouts in a Markdown file")]
pub struct Args {
    /// Markdown file to operate on
    pub file: PathBuf,

    /// Which callouts to target: current, section or all
    #[arg(short, long)]
    pub scope: Option<Scope>,

    /// How to set them: collapse, expand, toggle or toggle-individual
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// Reference (cursor) line, 1-based
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub line: u32,

    /// Print the resulting text instead of saving it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the parsed callout tree and exit
    #[arg(long)]
    pub outline: bool,

    /// Print the outline as JSON
    #[arg(long, requires = "outline")]
    pub json: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// 0-based cursor line.
    fn cursor_line(&self) -> usize {
        self.line.saturating_sub(1) as usize
    }
}

/// Defaults → config file → env vars → CLI flags.
fn resolve_config(args: &Args) -> Result<ResolvedConfig, AppError> {
    let config_file = config::load_config_with_precedence(args.config.clone())?;
    let merged = config::merge_config(config_file);
    let with_env = config::apply_env_overrides(merged);
    Ok(config::apply_cli_overrides(with_env, args.scope, args.mode))
}

fn print_outline(args: &Args) -> Result<(), AppError> {
    let editor = FileEditor::open(&args.file, 0)?;
    let callouts = parser::parse_document(&editor.contents());
    if args.json {
        println!("{}", outline::render_json(&callouts)?);
    } else {
        print!("{}", outline::render_outline(&callouts));
    }
    Ok(())
}

fn run(args: Args) -> Result<ExitCode, AppError> {
    let config = resolve_config(&args)?;
    callout_sync::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    if args.outline {
        print_outline(&args)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut editor = FileEditor::open(&args.file, args.cursor_line())?;
    let request = config.default_request();
    let Some(report) = state::run_operation::<_, MemorySurface>(
        &mut editor,
        None,
        request,
        &config.engine_options(),
    ) else {
        return Ok(ExitCode::FAILURE);
    };

    if args.dry_run {
        print!("{}", editor.contents());
    } else {
        editor.save()?;
    }

    eprintln!(
        "{} {}: {} target(s), {} header(s) rewritten, {} unchanged",
        report.mode, report.scope, report.targets, report.text_edits, report.unchanged
    );
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("callout-sync: {err}");
            ExitCode::FAILURE
        }
    }
}
