//! simfm: run one file-manager command against the real file system or a
//! simulated copy of it.
//!
//! The binary opens a session from the configuration, executes the command
//! line, prints the outcome and closes the session, which persists the
//! simulated tree.

mod args;
mod commands;

use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::Context;
use simfm_core::{Config, InfoMessage, Session};

use crate::args::{Args, CliCommand, USAGE};
use crate::commands::{run, Report};

fn main() -> anyhow::Result<()> {
    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    if args.command == CliCommand::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = load_config(&args)?;
    init_logging(&config)?;

    let report = match execute(&args.command, &config) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    print_messages(&report.messages);
    if report.failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Reads the config file and applies command-line overrides.
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default(),
        },
    };
    if let Some(mode) = args.mode {
        config.general.mode = mode;
    }
    if let Some(root) = &args.scan_root {
        config.simulation.scan_root = Some(root.clone());
    }
    Ok(config)
}

/// Logs to a file so stdout carries only command output.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let path = config.logging.file_path();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let level = config
        .logging
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

/// Opens the session, runs the command and always closes the session, so
/// simulated work is saved even when the command fails.
fn execute(command: &CliCommand, config: &Config) -> anyhow::Result<Report> {
    let mut session = Session::open(config).context("failed to open session")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match &mut session {
        Session::Live(fm) => run(fm, command, &mut out),
        Session::Simulated { manager, .. } => run(manager, command, &mut out),
    };
    out.flush()?;

    if let Some(path) = session.close().context("failed to save simulated tree")? {
        tracing::info!("simulated tree saved to {}", path.display());
    }
    result
}

fn print_messages(messages: &[InfoMessage]) {
    for message in messages {
        eprintln!("{}", message.text());
    }
}
