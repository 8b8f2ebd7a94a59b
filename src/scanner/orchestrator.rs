//! Scan orchestration.
//!
//! Owns every channel of a scan, launches the three worker pools, feeds the
//! queues and synchronizes completion. The ordering is fixed:
//!
//! 1. spawn `workers` TCP and `workers` UDP workers on one shared port queue,
//!    plus the ICMP pool on the address queue
//! 2. enqueue every port, close the port queue
//! 3. enqueue every address, close the address queue
//! 4. drain exactly one outcome per enqueued port
//! 5. join every worker and collect its completion token
//! 6. drain the open-port and reachability channels and hand off
//!
//! TCP and UDP workers compete for the same ports, so each port is probed by
//! exactly one protocol. This bounds concurrent sockets at `2 × workers`.

use crate::error::{ResolutionError, ScanError, ScanResult};
use crate::scanner::icmp::IcmpProbe;
use crate::scanner::messages::{AddressTask, PortOutcome, PortTask, WorkerKind, WorkerReport};
use crate::scanner::outcome::{OutcomeTally, ScanOutcome};
use crate::scanner::tcp::TcpConnectProbe;
use crate::scanner::traits::{EchoProbe, PortProbe, PortStatus};
use crate::scanner::udp::UdpProbe;
use crate::scanner::worker::{icmp_worker, port_worker, PortSinks, WorkQueue};
use crate::scanner::ScanConfig;
use crate::services::ServiceTable;
use crate::types::{ScanId, ScanTarget};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// The probes a scan runs with.
#[derive(Clone)]
pub struct Probes {
    pub tcp: Arc<dyn PortProbe>,
    pub udp: Arc<dyn PortProbe>,
    pub icmp: Arc<dyn EchoProbe>,
}

impl Probes {
    /// Real network probes aimed at the target's primary address.
    ///
    /// Fails with [`ResolutionError::NoAddresses`] before opening any socket
    /// when the target has nothing to probe.
    pub fn network(target: &ScanTarget, config: &ScanConfig) -> ScanResult<Self> {
        let addr = target
            .primary_address()
            .ok_or_else(|| ResolutionError::NoAddresses(target.domain().to_string()))?;

        let icmp = IcmpProbe::new(config.icmp_timeout);
        if !icmp.is_available() {
            warn!("no ICMP socket could be opened; every address will report Unreachable");
        }

        Ok(Self {
            tcp: Arc::new(TcpConnectProbe::new(addr, config.tcp_timeout)),
            udp: Arc::new(UdpProbe::with_payload(
                addr,
                config.udp_timeout,
                config.udp_payload.clone(),
            )),
            icmp: Arc::new(icmp),
        })
    }
}

/// Runs scans against a fixed set of probes and service table.
pub struct Orchestrator {
    probes: Probes,
    services: Arc<ServiceTable>,
    progress: Option<ProgressBar>,
}

impl Orchestrator {
    pub fn new(probes: Probes, services: Arc<ServiceTable>) -> Self {
        Self {
            probes,
            services,
            progress: None,
        }
    }

    /// Tick a progress bar once per drained port outcome.
    pub fn with_progress(mut self) -> Self {
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            pb.set_style(style.progress_chars("=>-"));
        }
        self.progress = Some(pb);
        self
    }

    /// Scan `target` to completion.
    ///
    /// Fails only when the target has no address or when the worker
    /// accounting breaks; individual probe failures are outcomes.
    pub async fn scan(&self, target: &ScanTarget) -> ScanResult<ScanOutcome> {
        let addresses = target.addresses();
        if addresses.is_empty() {
            return Err(ResolutionError::NoAddresses(target.domain().to_string()).into());
        }

        let ports = target.ports();
        let workers = target.workers();
        let icmp_pool = target.icmp_pool_size();
        let expected_tokens = 2 * workers + icmp_pool;

        let id = ScanId::new();
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(
            scan = %id.short(),
            target = %target,
            ports = ports.len(),
            addresses = addresses.len(),
            workers,
            icmp_pool,
            "starting scan"
        );
        debug!(
            probe_target = %self.probes.tcp.target(),
            tcp_timeout = ?self.probes.tcp.timeout(),
            udp_timeout = ?self.probes.udp.timeout(),
            icmp_timeout = ?self.probes.icmp.timeout(),
            "probe settings"
        );

        // Every result channel can hold the whole scan, so no worker ever
        // blocks on a send while the orchestrator waits on another channel.
        let port_cap = ports.len().max(1);
        let (port_tx, port_rx) = mpsc::channel(port_cap);
        let (addr_tx, addr_rx) = mpsc::channel(addresses.len());
        let (outcome_tx, mut outcome_rx) = mpsc::channel(port_cap);
        let (tcp_tx, mut tcp_rx) = mpsc::channel(port_cap);
        let (udp_tx, mut udp_rx) = mpsc::channel(port_cap);
        let (icmp_tx, mut icmp_rx) = mpsc::channel(addresses.len());

        let port_queue = WorkQueue::new(port_rx);
        let addr_queue = WorkQueue::new(addr_rx);
        let mut pool: JoinSet<WorkerReport> = JoinSet::new();

        for index in 0..workers {
            pool.spawn(port_worker(
                index,
                Arc::clone(&self.probes.tcp),
                port_queue.clone(),
                Arc::clone(&self.services),
                PortSinks {
                    outcomes: outcome_tx.clone(),
                    open: tcp_tx.clone(),
                },
            ));
            pool.spawn(port_worker(
                index,
                Arc::clone(&self.probes.udp),
                port_queue.clone(),
                Arc::clone(&self.services),
                PortSinks {
                    outcomes: outcome_tx.clone(),
                    open: udp_tx.clone(),
                },
            ));
        }
        for index in 0..icmp_pool {
            pool.spawn(icmp_worker(
                index,
                Arc::clone(&self.probes.icmp),
                addr_queue.clone(),
                icmp_tx.clone(),
            ));
        }

        debug_assert_eq!(pool.len(), expected_tokens);

        // Workers now hold the only senders: each result channel closes
        // exactly when the last worker writing to it returns.
        drop((outcome_tx, tcp_tx, udp_tx, icmp_tx));
        drop((port_queue, addr_queue));

        for &port in ports {
            port_tx
                .send(PortTask(port.as_u16()))
                .await
                .map_err(|_| ScanError::WorkerFailed("port queue closed early".to_string()))?;
        }
        drop(port_tx);

        for &address in addresses {
            addr_tx
                .send(AddressTask(address))
                .await
                .map_err(|_| ScanError::WorkerFailed("address queue closed early".to_string()))?;
        }
        drop(addr_tx);

        if let Some(pb) = &self.progress {
            pb.set_length(ports.len() as u64);
        }

        let tally = match drain_outcomes(&mut outcome_rx, ports.len(), self.progress.as_ref()).await
        {
            Ok(tally) => tally,
            Err(incomplete) => {
                // A worker that died mid-port explains the short-fall.
                join_workers(&mut pool).await?;
                return Err(incomplete);
            }
        };

        let reports = join_workers(&mut pool).await?;
        check_tokens(&reports, workers, icmp_pool)?;

        if outcome_rx.recv().await.is_some() {
            warn!("port outcomes arrived past the expected count");
        }

        let mut open_tcp = Vec::new();
        while let Some(record) = tcp_rx.recv().await {
            open_tcp.push(record);
        }
        let mut open_udp = Vec::new();
        while let Some(record) = udp_rx.recv().await {
            open_udp.push(record);
        }
        let mut reachability = Vec::with_capacity(addresses.len());
        while let Some(record) = icmp_rx.recv().await {
            reachability.push(record);
        }

        open_tcp.sort_by_key(|r| r.port);
        open_udp.sort_by_key(|r| r.port);
        reachability.sort_by_key(|r| addresses.iter().position(|a| *a == r.address));

        if let Some(pb) = &self.progress {
            pb.finish_with_message("scan complete");
        }

        let outcome = ScanOutcome {
            id,
            domain: target.domain().to_string(),
            addresses: addresses.to_vec(),
            started_at,
            completed_at: Utc::now(),
            duration_ms: clock.elapsed().as_millis() as u64,
            ports_scanned: ports.len(),
            tally,
            open_tcp,
            open_udp,
            reachability,
            workers: reports,
        };
        info!(scan = %id.short(), "{}", outcome.summary());

        Ok(outcome)
    }
}

/// Receive exactly `expected` port outcomes, or fail if the channel closes first.
async fn drain_outcomes(
    rx: &mut mpsc::Receiver<PortOutcome>,
    expected: usize,
    progress: Option<&ProgressBar>,
) -> ScanResult<OutcomeTally> {
    let mut tally = OutcomeTally::default();
    for received in 0..expected {
        let Some(outcome) = rx.recv().await else {
            return Err(ScanError::IncompleteScan { expected, received });
        };
        tally.record(&outcome);
        if let Some(pb) = progress {
            pb.inc(1);
            if outcome.status == PortStatus::Open {
                pb.set_message(format!("open: {}/{}", outcome.port, outcome.protocol));
            }
        }
    }
    Ok(tally)
}

/// Join every worker in the pool. A task that panicked is `WorkerFailed`.
async fn join_workers(pool: &mut JoinSet<WorkerReport>) -> ScanResult<Vec<WorkerReport>> {
    let mut reports = Vec::with_capacity(pool.len());
    let mut failure = None;
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(e) => {
                warn!(error = %e, "worker task failed");
                failure.get_or_insert_with(|| e.to_string());
            }
        }
    }
    match failure {
        Some(reason) => Err(ScanError::WorkerFailed(reason)),
        None => Ok(reports),
    }
}

/// Every launched worker must have handed back exactly one token.
fn check_tokens(reports: &[WorkerReport], workers: usize, icmp_pool: usize) -> ScanResult<()> {
    let count = |kind: WorkerKind| reports.iter().filter(|r| r.kind == kind).count();
    if count(WorkerKind::Tcp) != workers
        || count(WorkerKind::Udp) != workers
        || count(WorkerKind::Icmp) != icmp_pool
    {
        return Err(ScanError::CompletionMismatch {
            expected: 2 * workers + icmp_pool,
            received: reports.len(),
        });
    }
    debug!(tokens = reports.len(), "all workers done");
    Ok(())
}

/// Scan `target` with the real network probes and the built-in service table.
pub async fn scan(target: &ScanTarget, config: &ScanConfig) -> ScanResult<ScanOutcome> {
    let services = Arc::new(ServiceTable::well_known().clone());
    let mut orchestrator = Orchestrator::new(Probes::network(target, config)?, services);
    if config.progress {
        orchestrator = orchestrator.with_progress();
    }
    orchestrator.scan(target).await
}
