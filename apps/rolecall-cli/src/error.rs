use std::path::PathBuf;

use rolecall_engine::{ConfigError, EngineError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Script check failed:\n  {}", .0.join("\n  "))]
    Check(Vec<String>),

    #[error("Step {step} ({op}) failed: {source}")]
    Step {
        step: usize,
        op: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("Step {step} ({op}) expected a {expected} error but succeeded")]
    UnexpectedSuccess {
        step: usize,
        op: &'static str,
        expected: ErrorKind,
    },

    #[error("Unknown label '{0}'")]
    UnknownLabel(String),

    #[error("Metrics error: {0}")]
    Metrics(String),
}
