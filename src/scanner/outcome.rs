//! Aggregated result of one scan, handed to the result sink.

use crate::scanner::messages::{PortOutcome, ReachabilityRecord, ServiceRecord, WorkerReport};
use crate::scanner::traits::{PortStatus, Protocol, Reachability};
use crate::types::ScanId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Per-protocol counts of drained port outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub tcp_open: usize,
    pub tcp_closed: usize,
    pub udp_open: usize,
    pub udp_closed: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &PortOutcome) {
        let slot = match (outcome.protocol, outcome.status) {
            (Protocol::Tcp, PortStatus::Open) => &mut self.tcp_open,
            (Protocol::Tcp, PortStatus::Closed) => &mut self.tcp_closed,
            (Protocol::Udp, PortStatus::Open) => &mut self.udp_open,
            (Protocol::Udp, PortStatus::Closed) => &mut self.udp_closed,
        };
        *slot += 1;
    }

    /// Total outcomes recorded; equals the number of ports probed.
    pub fn total(&self) -> usize {
        self.tcp_open + self.tcp_closed + self.udp_open + self.udp_closed
    }
}

/// Everything a completed scan produced.
///
/// Records are sorted (ports ascending, addresses in resolution order) before
/// hand-off; workers emit them in no particular order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub id: ScanId,
    pub domain: String,
    pub addresses: Vec<IpAddr>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub ports_scanned: usize,
    pub tally: OutcomeTally,
    pub open_tcp: Vec<ServiceRecord>,
    pub open_udp: Vec<ServiceRecord>,
    pub reachability: Vec<ReachabilityRecord>,
    #[serde(skip)]
    pub workers: Vec<WorkerReport>,
}

impl ScanOutcome {
    /// Number of completion tokens collected.
    pub fn completion_tokens(&self) -> usize {
        self.workers.len()
    }

    pub fn reachable_count(&self) -> usize {
        self.reachability
            .iter()
            .filter(|r| r.reachability == Reachability::Reachable)
            .count()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} open TCP, {} open UDP, {}/{} reachable [{:.2}s]",
            self.domain,
            self.open_tcp.len(),
            self.open_udp.len(),
            self.reachable_count(),
            self.reachability.len(),
            self.duration_ms as f64 / 1000.0
        )
    }
}
