//! Skriptor - run declarative setup scripts from your terminal.
//!
//! Scripts are fetched from a Skriptor server by code (or read from a local
//! YAML file) and their steps are executed in order.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use skriptor::engine::ASK_USER;
use skriptor::operations::{AskUser, PresetPrompter, StdinPrompter};
use skriptor::{
    builtin_registry, logging, ConfigLoader, ConfigSource, Engine, LogUploader,
    RunStatus, ScriptConfig, Settings, TemplateMode, Utils,
};

/// Run declarative setup scripts
#[derive(Parser)]
#[command(name = "skriptor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a setup script
    Run(RunArgs),

    /// Print a run log
    ViewLogs {
        /// Directory holding the logs
        dir: PathBuf,

        /// Log file name
        log_file: String,
    },

    /// List the available operations
    Operations,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Script code on the server (also names the log file)
    code: String,

    /// Read the script from a local YAML file instead of the server
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Fail on placeholders that have no value
    #[arg(long)]
    strict: bool,

    /// Show the compiled steps without executing them
    #[arg(long)]
    dry_run: bool,

    /// Upload the run log to the server afterwards
    #[arg(long)]
    upload_log: bool,

    /// Pre-answer a question (VARIABLE=VALUE, repeatable)
    #[arg(short, long = "answer", value_name = "VARIABLE=VALUE")]
    answers: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Run(args) => cmd_run(args, cli.verbose),
        Commands::ViewLogs { dir, log_file } => cmd_view_logs(&dir, &log_file),
        Commands::Operations => cmd_operations(cli.verbose),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Execute a script.
fn cmd_run(args: RunArgs, verbose: bool) -> Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;

    let log_path = (!args.dry_run).then(|| logging::new_log_path(&settings.log_dir, &args.code));
    logging::init(verbose, log_path.as_deref())?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let result = run_script(&args, &settings, log_path.as_deref()).await;

        match &result {
            Ok(()) if args.dry_run => {}
            Ok(()) => tracing::info!("Setup completed successfully!"),
            Err(e) => tracing::error!("Error during setup: {e:#}"),
        }

        if let Some(path) = &log_path {
            println!("Access the log file for more details: {}", path.display());

            if args.upload_log {
                let status = if result.is_ok() { RunStatus::Success } else { RunStatus::Failure };
                if let Err(e) = upload(&settings, path, &args.code, status).await {
                    tracing::warn!("Failed to upload log file: {e}");
                }
            }
        }

        result
    })
}

async fn run_script(args: &RunArgs, settings: &Settings, log_path: Option<&Path>) -> Result<()> {
    let source = match &args.file {
        Some(path) => ConfigSource::File(path.clone()),
        None => ConfigSource::Remote(args.code.clone()),
    };

    let config = ConfigLoader::new(settings)?.load(&source).await?;

    let mut registry = builtin_registry(settings);
    if !args.answers.is_empty() {
        let presets = PresetPrompter::parse_assignments(&args.answers)?;
        let prompter = PresetPrompter::new(presets, Arc::new(StdinPrompter));
        registry.register(ASK_USER, AskUser::new(Arc::new(prompter)));
    }

    let mut utils = Utils::new();
    if let Some(path) = log_path {
        utils = utils.with_log_file(path);
    }

    let mode = if args.strict { TemplateMode::Strict } else { TemplateMode::Lenient };
    let mut engine = Engine::new(registry, utils).with_template_mode(mode);

    if args.dry_run {
        return print_preview(&engine, &config);
    }

    let report = engine.execute(&config).await?;
    tracing::debug!(steps = report.steps.len(), duration = ?report.duration, "Run finished");
    Ok(())
}

fn print_preview(engine: &Engine, config: &ScriptConfig) -> Result<()> {
    let steps = engine.preview(config)?;

    println!("DRY RUN - Steps that would be executed:");
    for (i, step) in steps.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, step.kind(), step.name());
        for (key, value) in step.fields() {
            if key != "type" && key != "name" {
                println!("       {key}: {value}");
            }
        }
    }
    Ok(())
}

async fn upload(settings: &Settings, path: &Path, code: &str, status: RunStatus) -> Result<()> {
    LogUploader::new(settings)?.upload(path, code, status).await?;
    println!("Log file uploaded successfully");
    Ok(())
}

/// Print a run log.
fn cmd_view_logs(dir: &Path, log_file: &str) -> Result<()> {
    let path = dir.join(log_file);
    println!("Accessing log file: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Error reading log file {}", path.display()))?;
    print!("{content}");
    Ok(())
}

/// List the available operations.
fn cmd_operations(verbose: bool) -> Result<()> {
    logging::init(verbose, None)?;
    let settings = Settings::load().context("Failed to load settings")?;
    let registry = builtin_registry(&settings);

    println!("Available operations ({}):\n", registry.len());
    for (name, op) in registry.iter() {
        println!("  {name:<18} {}", op.description());
    }
    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "skriptor", &mut io::stdout());
}
