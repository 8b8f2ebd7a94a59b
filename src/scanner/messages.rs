//! Typed messages carried by the scan channels.
//!
//! Each channel gets its own message type, so a port number can never be
//! mistaken for a completion signal or a result.

use crate::scanner::traits::{PortStatus, Protocol, Reachability};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// One unit of work on the shared port queue. Consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortTask(pub u16);

/// One unit of work on the address queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressTask(pub IpAddr);

/// Emitted once per dequeued port, open or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortOutcome {
    pub port: u16,
    pub protocol: Protocol,
    pub status: PortStatus,
}

/// A confirmed-open port with its looked-up service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub port: u16,
    pub protocol: Protocol,
    pub service: String,
    pub response: String,
}

impl fmt::Display for ServiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Port {} ({}) is Open, Service: {}",
            self.port, self.protocol, self.service
        )
    }
}

/// ICMP result for one resolved address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityRecord {
    pub address: IpAddr,
    pub reachability: Reachability,
}

impl fmt::Display for ReachabilityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IP: {}, Response: {}", self.address, self.reachability)
    }
}

/// Which pool a worker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerKind {
    Tcp,
    Udp,
    Icmp,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
            Self::Icmp => write!(f, "icmp"),
        }
    }
}

/// Completion token: returned by a worker exactly once, after its input queue
/// closed and it stopped emitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub kind: WorkerKind,
    pub index: usize,
    pub processed: usize,
}
