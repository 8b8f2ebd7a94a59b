//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Probe failures are not
//! errors: a refused connection or a missing reply is a scan outcome, so none
//! of these types appear on the probe path.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a target string into at least one address.
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    #[error("failed to resolve '{0}': {1}")]
    LookupFailed(String, String),

    #[error("no addresses found for '{0}'")]
    NoAddresses(String),

    #[error("'{0}' is neither an IP address nor a valid hostname")]
    InvalidHostname(String),

    #[error("target is empty")]
    EmptyTarget,
}

/// Errors raised by the scan orchestrator.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("scan ended after {received} of {expected} port outcomes")]
    IncompleteScan { expected: usize, received: usize },

    #[error("worker task failed: {0}")]
    WorkerFailed(String),

    #[error("collected {received} completion tokens, expected {expected}")]
    CompletionMismatch { expected: usize, received: usize },
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors loading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from the result sink. Local to report writing, never unwinds a scan.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Top-level error for the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Port(#[from] crate::types::PortError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("failed to read target from stdin: {0}")]
    Prompt(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
