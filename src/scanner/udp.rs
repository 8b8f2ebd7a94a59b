//! UDP probe.
//!
//! Sends a fixed payload on a connected datagram socket and waits for any
//! reply within the read deadline.
//!
//! # Detection
//!
//! 1. **Any datagram back**: port is open
//! 2. **ICMP port unreachable** (surfaces as a refused `recv`): closed
//! 3. **No reply before the deadline**: closed
//!
//! Case 3 is a known false-negative surface. An open service that ignores the
//! probe payload cannot be told apart from a closed port, and the probe does
//! not retry.

use crate::scanner::traits::{PortProbe, PortStatus, Protocol};
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::trace;

/// Default read deadline.
pub const DEFAULT_UDP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default probe payload.
pub const DEFAULT_UDP_PAYLOAD: &[u8] = b"ping";

const RECV_BUFFER: usize = 1024;

/// UDP probe with a fixed payload.
pub struct UdpProbe {
    target: IpAddr,
    timeout: Duration,
    payload: Arc<[u8]>,
}

impl UdpProbe {
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self::with_payload(target, timeout, DEFAULT_UDP_PAYLOAD)
    }

    pub fn with_payload(target: IpAddr, timeout: Duration, payload: impl Into<Arc<[u8]>>) -> Self {
        Self {
            target,
            timeout,
            payload: payload.into(),
        }
    }

    async fn exchange(&self, port: u16) -> io::Result<usize> {
        let local: SocketAddr = match self.target {
            IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(SocketAddr::new(self.target, port)).await?;
        socket.send(&self.payload).await?;

        let mut buf = [0u8; RECV_BUFFER];
        match timeout(self.timeout, socket.recv(&mut buf)).await {
            Ok(received) => received,
            Err(_) => Err(io::ErrorKind::TimedOut.into()),
        }
    }
}

#[async_trait]
impl PortProbe for UdpProbe {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, port: u16) -> PortStatus {
        match self.exchange(port).await {
            Ok(n) => {
                trace!(target = %self.target, port, bytes = n, "udp reply received");
                PortStatus::Open
            }
            Err(e) => {
                trace!(target = %self.target, port, error = %e, "udp probe got no reply");
                PortStatus::Closed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bind a loopback responder that answers every datagram with "pong".
    async fn spawn_responder() -> u16 {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            while let Ok((_, peer)) = socket.recv_from(&mut buf).await {
                let _ = socket.send_to(b"pong", peer).await;
            }
        });
        port
    }

    fn probe() -> UdpProbe {
        UdpProbe::new(IpAddr::V4(Ipv4Addr::LOCALHOST), Duration::from_secs(1))
    }

    #[test]
    fn test_default_payload() {
        let probe = probe();
        assert_eq!(&*probe.payload, b"ping");
        assert_eq!(probe.protocol(), Protocol::Udp);
    }

    #[tokio::test]
    async fn test_responder_is_open() {
        let port = spawn_responder().await;
        assert_eq!(probe().probe(port).await, PortStatus::Open);
    }

    #[tokio::test]
    async fn test_silent_port_is_closed() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        drop(socket);

        assert_eq!(probe().probe(port).await, PortStatus::Closed);
    }

    #[tokio::test]
    async fn test_bound_but_mute_port_is_closed() {
        // Open but never answers: the documented false negative.
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();

        let probe = UdpProbe::new(IpAddr::V4(Ipv4Addr::LOCALHOST), Duration::from_millis(200));
        assert_eq!(probe.probe(port).await, PortStatus::Closed);
        drop(socket);
    }
}
