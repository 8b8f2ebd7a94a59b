//! Worker loops for the three probe pools.
//!
//! Every worker runs the same cycle: wait for the next task, probe, emit,
//! repeat. When its queue is closed and empty it stops and returns a
//! [`WorkerReport`], which is its completion token. A worker never writes
//! back into the queue it consumes.

use crate::scanner::messages::{
    AddressTask, PortOutcome, PortTask, ReachabilityRecord, ServiceRecord, WorkerKind,
    WorkerReport,
};
use crate::scanner::traits::{EchoProbe, PortProbe, PortStatus, Protocol};
use crate::services::ServiceTable;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

/// Multi-consumer view of a single-producer queue.
///
/// tokio's mpsc receiver has one owner; workers share it behind an async
/// mutex held only while waiting for the next item, never while probing.
pub struct WorkQueue<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> WorkQueue<T> {
    pub fn new(rx: mpsc::Receiver<T>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Next task, or `None` once the producer closed the queue and it drained.
    pub async fn next(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

/// Output channels of a TCP or UDP worker.
#[derive(Clone)]
pub struct PortSinks {
    pub outcomes: mpsc::Sender<PortOutcome>,
    pub open: mpsc::Sender<ServiceRecord>,
}

/// Consume ports until the queue closes.
///
/// Emits exactly one [`PortOutcome`] per dequeued port and a
/// [`ServiceRecord`] for each open one.
pub async fn port_worker(
    index: usize,
    probe: Arc<dyn PortProbe>,
    queue: WorkQueue<PortTask>,
    services: Arc<ServiceTable>,
    sinks: PortSinks,
) -> WorkerReport {
    let protocol = probe.protocol();
    let kind = match protocol {
        Protocol::Tcp => WorkerKind::Tcp,
        Protocol::Udp => WorkerKind::Udp,
    };
    let mut processed = 0;

    while let Some(PortTask(port)) = queue.next().await {
        let status = probe.probe(port).await;
        processed += 1;

        if status == PortStatus::Open {
            let record = services.detect(port, protocol);
            debug!(port, %protocol, service = %record.service, "port open");
            if sinks.open.send(record).await.is_err() {
                break;
            }
        } else {
            debug!(port, %protocol, "port closed");
        }

        let outcome = PortOutcome {
            port,
            protocol,
            status,
        };
        if sinks.outcomes.send(outcome).await.is_err() {
            break;
        }
    }

    debug!(worker = index, %kind, processed, "worker done");
    WorkerReport {
        kind,
        index,
        processed,
    }
}

/// Consume addresses until the queue closes, one echo per address.
pub async fn icmp_worker(
    index: usize,
    probe: Arc<dyn EchoProbe>,
    queue: WorkQueue<AddressTask>,
    results: mpsc::Sender<ReachabilityRecord>,
) -> WorkerReport {
    let mut processed = 0;

    while let Some(AddressTask(address)) = queue.next().await {
        let reachability = probe.echo(address).await;
        processed += 1;

        debug!(%address, %reachability, "echo result");
        let record = ReachabilityRecord {
            address,
            reachability,
        };
        if results.send(record).await.is_err() {
            break;
        }
    }

    debug!(worker = index, kind = %WorkerKind::Icmp, processed, "worker done");
    WorkerReport {
        kind: WorkerKind::Icmp,
        index,
        processed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::tcp::TcpConnectProbe;
    use crate::scanner::traits::Reachability;
    use crate::scanner::udp::UdpProbe;
    use async_trait::async_trait;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;
    use tokio::net::{TcpListener, UdpSocket};

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn port_channels(
        cap: usize,
    ) -> (
        PortSinks,
        mpsc::Receiver<PortOutcome>,
        mpsc::Receiver<ServiceRecord>,
    ) {
        let (outcomes, outcome_rx) = mpsc::channel(cap);
        let (open, open_rx) = mpsc::channel(cap);
        (PortSinks { outcomes, open }, outcome_rx, open_rx)
    }

    fn queue_of<T: std::fmt::Debug>(items: Vec<T>) -> WorkQueue<T> {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            tx.try_send(item).unwrap();
        }
        WorkQueue::new(rx)
    }

    #[tokio::test]
    async fn test_work_queue_drains_then_closes() {
        let queue = queue_of(vec![PortTask(1), PortTask(2)]);
        assert_eq!(queue.next().await, Some(PortTask(1)));
        assert_eq!(queue.clone().next().await, Some(PortTask(2)));
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn test_tcp_worker_reports_open_and_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = closed.local_addr().unwrap().port();
        drop(closed);

        let services: ServiceTable = [(open_port, "HTTP")].into_iter().collect();
        let (sinks, mut outcome_rx, mut open_rx) = port_channels(4);
        let probe = Arc::new(TcpConnectProbe::new(LOCALHOST, Duration::from_secs(2)));

        let report = port_worker(
            0,
            probe,
            queue_of(vec![PortTask(open_port), PortTask(closed_port)]),
            Arc::new(services),
            sinks,
        )
        .await;

        assert_eq!(report.kind, WorkerKind::Tcp);
        assert_eq!(report.processed, 2);

        let first = outcome_rx.recv().await.unwrap();
        let second = outcome_rx.recv().await.unwrap();
        assert_eq!((first.port, first.status), (open_port, PortStatus::Open));
        assert_eq!((second.port, second.status), (closed_port, PortStatus::Closed));
        assert!(outcome_rx.recv().await.is_none());

        let record = open_rx.recv().await.unwrap();
        assert_eq!(record.port, open_port);
        assert_eq!(record.protocol, Protocol::Tcp);
        assert_eq!(record.service, "HTTP");
        assert!(open_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_udp_worker_reports_responder() {
        let responder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let open_port = responder.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            while let Ok((_, peer)) = responder.recv_from(&mut buf).await {
                let _ = responder.send_to(b"pong", peer).await;
            }
        });

        let services: ServiceTable = [(open_port, "DNS")].into_iter().collect();
        let (sinks, mut outcome_rx, mut open_rx) = port_channels(4);
        let probe = Arc::new(UdpProbe::new(LOCALHOST, Duration::from_secs(1)));

        let report = port_worker(
            3,
            probe,
            queue_of(vec![PortTask(open_port)]),
            Arc::new(services),
            sinks,
        )
        .await;

        assert_eq!(report.kind, WorkerKind::Udp);
        assert_eq!(report.index, 3);
        assert_eq!(outcome_rx.recv().await.unwrap().status, PortStatus::Open);

        let record = open_rx.recv().await.unwrap();
        assert_eq!(record.service, "DNS");
        assert_eq!(record.protocol, Protocol::Udp);
    }

    struct FixedEcho;

    #[async_trait]
    impl EchoProbe for FixedEcho {
        fn timeout(&self) -> Duration {
            Duration::ZERO
        }

        async fn echo(&self, addr: IpAddr) -> Reachability {
            if addr.is_loopback() {
                Reachability::Reachable
            } else {
                Reachability::Unreachable
            }
        }
    }

    #[tokio::test]
    async fn test_icmp_worker_emits_one_record_per_address() {
        let other = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
        let (tx, mut rx) = mpsc::channel(2);

        let report = icmp_worker(
            0,
            Arc::new(FixedEcho),
            queue_of(vec![AddressTask(LOCALHOST), AddressTask(other)]),
            tx,
        )
        .await;

        assert_eq!(report.kind, WorkerKind::Icmp);
        assert_eq!(report.processed, 2);
        assert_eq!(
            rx.recv().await.unwrap().to_string(),
            "IP: 127.0.0.1, Response: Reachable"
        );
        assert_eq!(
            rx.recv().await.unwrap().to_string(),
            "IP: 192.0.2.1, Response: Unreachable"
        );
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_worker_on_closed_empty_queue_finishes_immediately() {
        let (sinks, mut outcome_rx, _open_rx) = port_channels(1);
        let probe = Arc::new(TcpConnectProbe::new(LOCALHOST, Duration::from_secs(1)));

        let report = port_worker(
            0,
            probe,
            queue_of(Vec::new()),
            Arc::new(ServiceTable::default()),
            sinks,
        )
        .await;

        assert_eq!(report.processed, 0);
        assert!(outcome_rx.recv().await.is_none());
    }
}
