//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

use student_habits::LoadOptions;

#[derive(Parser, Debug)]
#[command(
    name = "student-habits",
    version,
    about = "Clean, enrich and summarize a student habits and exam performance dataset"
)]
pub struct Cli {
    /// Path to the student habits CSV file.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Also report the mean exam score grouped by this column.
    #[arg(long = "group-by", value_name = "COLUMN")]
    pub group_by: Option<String>,

    /// Output format for the report.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Field separator of the input file.
    #[arg(long = "separator", default_value_t = ',')]
    pub separator: char,

    /// Rows scanned to infer column types (0 scans the whole file).
    #[arg(long = "infer-schema-length", default_value_t = 10000)]
    pub infer_schema_length: usize,

    /// Fail on cells that do not match the inferred column type.
    #[arg(long = "strict-parse")]
    pub strict_parse: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl Cli {
    pub fn load_options(&self) -> anyhow::Result<LoadOptions> {
        let separator = u8::try_from(self.separator).map_err(|_| {
            anyhow::anyhow!("separator must be a single-byte character: {:?}", self.separator)
        })?;
        Ok(LoadOptions {
            separator,
            infer_schema_length: (self.infer_schema_length > 0).then_some(self.infer_schema_length),
            ignore_errors: !self.strict_parse,
        })
    }
}
