//! Student Habits - exam performance analysis CLI
//!
//! Loads a student habits CSV, cleans and enriches it, and prints summary
//! statistics and groupings of the exam scores.

mod cli;

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use cli::{Cli, LogFormatArg, OutputFormatArg};
use student_habits::logging::{LogConfig, LogFormat, init_logging};
use student_habits::{AnalysisReport, StudentAnalysis};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.load_options()?;
    let mut analysis = StudentAnalysis::from_csv(&cli.input, &options)
        .with_context(|| format!("load {}", cli.input.display()))?;
    analysis.prepare().context("prepare student table")?;

    let report = AnalysisReport::collect(&analysis, cli.group_by.as_deref())
        .context("compute report")?;
    match cli.format {
        OutputFormatArg::Table => println!("{}", report.render_text()),
        OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&report.to_json())?),
    }
    Ok(())
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: io::stderr().is_terminal(),
        log_file: cli.log_file.clone(),
    }
}
