use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rolecall")]
#[command(about = "Replay staffing scenarios against an in-process rolecall engine")]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, env = "ROLECALL_FORMAT", value_enum, default_value_t = Format::Text)]
    pub format: Format,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a scenario script and print every step and the final mailboxes
    Run {
        /// Path to the JSON script
        script: PathBuf,

        /// Print Prometheus metrics after the run
        #[arg(long, env = "ROLECALL_METRICS")]
        metrics: bool,
    },
    /// Parse and validate a scenario script without running it
    Check {
        /// Path to the JSON script
        script: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}
