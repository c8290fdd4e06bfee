//! CLI entry point for vigil.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and
//! exit codes. All audit logic lives in the `vigil-app` crate.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::time::Duration;
use vigil_app::{render_text, run_audit, verdict_exit_code, RunnerOptions};
use vigil_checks::CheckRegistry;

#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    version,
    about = "Compliance audit runner probing live infrastructure state"
)]
struct Cli {
    /// Path to the audit configuration TOML.
    #[arg(long, default_value = "vigil.toml")]
    config: Utf8PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the configured audit and report findings.
    Run {
        /// Where to write the JSON report (skipped when not set).
        #[arg(long)]
        report_out: Option<Utf8PathBuf>,

        /// Per-check execution deadline in seconds (overrides config).
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List the registered check type identifiers.
    Checks,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = CheckRegistry::builtin();

    match cli.cmd {
        Commands::Run {
            ref report_out,
            timeout,
        } => cmd_run(&cli, &registry, report_out.clone(), timeout),
        Commands::Checks => cmd_checks(&registry),
    }
}

fn cmd_run(
    cli: &Cli,
    registry: &CheckRegistry,
    report_out: Option<Utf8PathBuf>,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let config_text = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("read config: {}", cli.config))?;
    let config = vigil_config::parse_config_toml(&config_text).context("parse config")?;

    let mut options = RunnerOptions::default();
    if let Some(seconds) = timeout.or(config.runner.timeout_seconds) {
        anyhow::ensure!(seconds > 0, "timeout must be positive");
        options.timeout = Duration::from_secs(seconds);
    }

    let report = run_audit(&config.checks, registry, &options);

    if let Some(path) = report_out {
        write_report_file(&path, serde_json::to_string_pretty(&report)?)
            .context("write report json")?;
    }

    print!("{}", render_text(&report));

    let code = verdict_exit_code(report.verdict);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn cmd_checks(registry: &CheckRegistry) -> anyhow::Result<()> {
    for type_id in registry.type_identifiers() {
        println!("{type_id}");
    }
    Ok(())
}

fn write_report_file(path: &camino::Utf8Path, data: String) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}
