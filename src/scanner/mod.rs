//! Scanner module - probes, worker pools and the scan orchestrator.
//!
//! TCP connect and UDP probes share one port queue; ICMP echo runs on its own
//! bounded pool. [`scan`] wires the real network probes to an
//! [`Orchestrator`]; tests drive the orchestrator with fakes through the
//! [`PortProbe`] and [`EchoProbe`] traits.

pub mod icmp;
pub mod messages;
pub mod orchestrator;
pub mod outcome;
pub mod tcp;
pub mod traits;
pub mod udp;
pub mod worker;

use std::sync::Arc;
use std::time::Duration;

pub use icmp::{IcmpProbe, DEFAULT_ICMP_TIMEOUT};
pub use messages::{
    AddressTask, PortOutcome, PortTask, ReachabilityRecord, ServiceRecord, WorkerKind,
    WorkerReport,
};
pub use orchestrator::{scan, Orchestrator, Probes};
pub use outcome::{OutcomeTally, ScanOutcome};
pub use tcp::{TcpConnectProbe, DEFAULT_TCP_TIMEOUT};
pub use traits::{EchoProbe, PortProbe, PortStatus, Protocol, Reachability};
pub use udp::{UdpProbe, DEFAULT_UDP_PAYLOAD, DEFAULT_UDP_TIMEOUT};

/// Probe settings for one scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub tcp_timeout: Duration,
    pub udp_timeout: Duration,
    pub icmp_timeout: Duration,
    /// Datagram sent to every UDP port.
    pub udp_payload: Arc<[u8]>,
    /// Show a progress bar while draining port outcomes.
    pub progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tcp_timeout: DEFAULT_TCP_TIMEOUT,
            udp_timeout: DEFAULT_UDP_TIMEOUT,
            icmp_timeout: DEFAULT_ICMP_TIMEOUT,
            udp_payload: Arc::from(DEFAULT_UDP_PAYLOAD),
            progress: false,
        }
    }
}

impl ScanConfig {
    pub fn with_tcp_timeout(mut self, timeout: Duration) -> Self {
        self.tcp_timeout = timeout;
        self
    }

    pub fn with_udp_timeout(mut self, timeout: Duration) -> Self {
        self.udp_timeout = timeout;
        self
    }

    pub fn with_icmp_timeout(mut self, timeout: Duration) -> Self {
        self.icmp_timeout = timeout;
        self
    }

    pub fn with_udp_payload(mut self, payload: impl Into<Arc<[u8]>>) -> Self {
        self.udp_payload = payload.into();
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }
}
