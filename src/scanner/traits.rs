//! Probe trait abstractions.
//!
//! Workers only see these traits, so the orchestrator can be driven by the
//! real network probes or by in-memory fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Transport protocol of a port probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

/// Status of a probed port.
///
/// There is no filtered state: a timeout, a refusal and any other dial or
/// read error all classify as `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortStatus {
    Open,
    Closed,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// ICMP echo classification of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => write!(f, "Reachable"),
            Self::Unreachable => write!(f, "Unreachable"),
        }
    }
}

/// A single-port probe against one fixed address.
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Protocol this probe speaks.
    fn protocol(&self) -> Protocol;

    /// Address the probe is aimed at.
    fn target(&self) -> IpAddr;

    /// Configured per-port timeout.
    fn timeout(&self) -> Duration;

    /// Probe one port. Never fails: every error is a `Closed` port.
    async fn probe(&self, port: u16) -> PortStatus;
}

/// A single ICMP echo attempt against any address.
#[async_trait]
pub trait EchoProbe: Send + Sync {
    fn timeout(&self) -> Duration;

    /// Send one echo request and wait for its reply.
    async fn echo(&self, addr: IpAddr) -> Reachability;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Protocol::Tcp.to_string(), "TCP");
        assert_eq!(Protocol::Udp.to_string(), "UDP");
        assert_eq!(PortStatus::Open.to_string(), "Open");
        assert_eq!(PortStatus::Closed.to_string(), "Closed");
        assert_eq!(Reachability::Reachable.to_string(), "Reachable");
        assert_eq!(Reachability::Unreachable.to_string(), "Unreachable");
    }

    #[test]
    fn test_protocol_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Protocol::Udp).unwrap(), "\"UDP\"");
    }
}
