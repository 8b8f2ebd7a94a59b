//! Command-line interface definitions for portsweep.
//!
//! One command: `portsweep [TARGET] [OPTIONS]`. Flags override values from
//! the settings file, which override built-in defaults.

mod scan;

pub use scan::{is_root, prompt_target, ScanCommand};

use crate::error::CliResult;
use clap::Parser;
use std::path::PathBuf;

/// portsweep - full-range TCP/UDP port sweep with ICMP reachability.
///
/// Resolves the target, probes every port over TCP connect and UDP, pings
/// every resolved address, and writes a text report.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concurrent TCP/UDP port sweep with ICMP reachability", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub scan: ScanCommand,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub async fn execute(&self) -> CliResult<()> {
        self.scan.execute(self.config.as_deref(), self.quiet).await
    }
}
