//! ICMP echo probe.
//!
//! Uses `surge-ping`, which opens an unprivileged ICMP datagram socket where
//! the kernel allows it (`net.ipv4.ping_group_range` on Linux) and a raw socket
//! otherwise. If neither can be opened every address reports `Unreachable`;
//! a missing socket never aborts the scan.

use crate::scanner::traits::{EchoProbe, Reachability};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, ICMP};
use tracing::{debug, trace};

/// Default echo timeout.
pub const DEFAULT_ICMP_TIMEOUT: Duration = Duration::from_secs(5);

const ECHO_PAYLOAD: [u8; 56] = [0; 56];

/// ICMP echo probe holding one client per address family.
pub struct IcmpProbe {
    v4: Option<Client>,
    v6: Option<Client>,
    timeout: Duration,
}

impl IcmpProbe {
    /// Open the ICMP sockets. Must be called inside a tokio runtime.
    pub fn new(timeout: Duration) -> Self {
        Self {
            v4: open_client(ICMP::V4),
            v6: open_client(ICMP::V6),
            timeout,
        }
    }

    /// Whether at least one address family has a usable socket.
    pub fn is_available(&self) -> bool {
        self.v4.is_some() || self.v6.is_some()
    }

    fn client_for(&self, addr: IpAddr) -> Option<&Client> {
        match addr {
            IpAddr::V4(_) => self.v4.as_ref(),
            IpAddr::V6(_) => self.v6.as_ref(),
        }
    }
}

fn open_client(kind: ICMP) -> Option<Client> {
    let config = Config::builder().kind(kind).build();
    match Client::new(&config) {
        Ok(client) => Some(client),
        Err(e) => {
            debug!(?kind, error = %e, "cannot open ICMP socket");
            None
        }
    }
}

#[async_trait]
impl EchoProbe for IcmpProbe {
    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn echo(&self, addr: IpAddr) -> Reachability {
        let Some(client) = self.client_for(addr) else {
            return Reachability::Unreachable;
        };

        let mut pinger = client.pinger(addr, PingIdentifier(rand::random())).await;
        pinger.timeout(self.timeout);

        match pinger.ping(PingSequence(0), &ECHO_PAYLOAD).await {
            Ok((_, rtt)) => {
                trace!(%addr, rtt_ms = rtt.as_millis() as u64, "echo reply");
                Reachability::Reachable
            }
            Err(e) => {
                trace!(%addr, error = %e, "no echo reply");
                Reachability::Unreachable
            }
        }
    }
}
