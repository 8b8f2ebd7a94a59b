//! Core type definitions using newtype patterns for type safety.

mod port;
mod scan_id;
mod target;

pub use port::{Port, PortError, PortRange, PortSpec};
pub use scan_id::ScanId;
pub use target::{ScanTarget, TargetSpec, DEFAULT_ICMP_WORKERS, DEFAULT_WORKERS};
