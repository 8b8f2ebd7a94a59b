//! # portsweep - Concurrent Port Sweep with ICMP Reachability
//!
//! portsweep resolves a hostname, probes ports over TCP connect and UDP
//! through two worker pools sharing one port queue, pings every resolved
//! address from a bounded ICMP pool, and writes a three-section text report.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::scanner::{self, ScanConfig};
//! use portsweep::types::{PortSpec, ScanTarget};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ports = "1-1024".parse::<PortSpec>()?.to_ports();
//!     let target = ScanTarget::resolve("example.com", 100).await?.with_ports(ports);
//!
//!     let outcome = scanner::scan(&target, &ScanConfig::default()).await?;
//!     for record in &outcome.open_tcp {
//!         println!("{}", record);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port specs, targets and scan ids
//! - [`scanner`] - Probes, worker pools and the orchestrator
//! - [`services`] - Well-known port to service-name table
//! - [`config`] - Settings file and defaults
//! - [`output`] - Text report plus plain, JSON and CSV output
//! - [`cli`] - Command-line parsing and the scan command
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ResolutionError, ScanError};
pub use scanner::{
    scan, Orchestrator, PortStatus, Protocol, Reachability, ScanConfig, ScanOutcome,
};
pub use services::ServiceTable;
pub use types::{Port, PortSpec, ScanId, ScanTarget, TargetSpec};
