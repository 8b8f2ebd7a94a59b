//! TCP connect probe.
//!
//! Completes a full handshake through the OS socket API and immediately
//! drops the stream. No elevated privileges are needed.

use crate::scanner::traits::{PortProbe, PortStatus, Protocol};
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Default connect timeout.
pub const DEFAULT_TCP_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP connect probe.
///
/// A port is `Open` when the connection is established within the timeout.
/// Refusal, timeout and every other dial error are reported as `Closed`
/// without distinction.
pub struct TcpConnectProbe {
    target: IpAddr,
    timeout: Duration,
}

impl TcpConnectProbe {
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }
}

#[async_trait]
impl PortProbe for TcpConnectProbe {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, port: u16) -> PortStatus {
        let addr = SocketAddr::new(self.target, port);

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                PortStatus::Open
            }
            Ok(Err(e)) => {
                trace!(%addr, error = %e, "tcp connect failed");
                PortStatus::Closed
            }
            Err(_) => {
                trace!(%addr, "tcp connect timed out");
                PortStatus::Closed
            }
        }
    }
}
