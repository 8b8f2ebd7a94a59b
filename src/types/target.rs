//! Scan targets and their resolution.
//!
//! A target string is either an IP literal or a hostname. Hostnames resolve to
//! every address the resolver returns; all of them get an ICMP echo, and the
//! first one is the host whose ports are swept.

use crate::error::ResolutionError;
use crate::types::{Port, PortSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Default number of TCP workers (and, separately, UDP workers).
pub const DEFAULT_WORKERS: usize = 100;

/// Default size of the ICMP worker pool.
pub const DEFAULT_ICMP_WORKERS: usize = 32;

/// A fully resolved scan target.
///
/// Built once per scan. Everything is fixed after construction except the
/// port list, which [`ScanTarget::with_ports`] may narrow. Deserializing goes
/// through [`ScanTarget::new`], so an empty address list is rejected there too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScanTargetFields")]
pub struct ScanTarget {
    domain: String,
    addresses: Vec<IpAddr>,
    ports: Vec<Port>,
    workers: usize,
    icmp_workers: usize,
}

impl ScanTarget {
    /// Create a target over the full port range.
    ///
    /// Fails with [`ResolutionError::NoAddresses`] if `addresses` is empty.
    pub fn new(
        domain: impl Into<String>,
        addresses: Vec<IpAddr>,
        workers: usize,
    ) -> Result<Self, ResolutionError> {
        let domain = domain.into();
        if addresses.is_empty() {
            return Err(ResolutionError::NoAddresses(domain));
        }

        Ok(Self {
            domain,
            addresses,
            ports: PortSpec::full().to_ports(),
            workers: workers.max(1),
            icmp_workers: DEFAULT_ICMP_WORKERS,
        })
    }

    /// Resolve `target` and build a full-range scan target from the answer.
    pub async fn resolve(target: &str, workers: usize) -> Result<Self, ResolutionError> {
        let spec = TargetSpec::parse(target)?;
        let addresses = spec.resolve().await?;
        Self::new(spec.to_string(), addresses, workers)
    }

    /// Replace the port list.
    pub fn with_ports(mut self, ports: Vec<Port>) -> Self {
        self.ports = ports;
        self
    }

    /// Set the ICMP pool size.
    pub fn with_icmp_workers(mut self, icmp_workers: usize) -> Self {
        self.icmp_workers = icmp_workers.max(1);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    /// The address whose ports are swept.
    pub fn primary_address(&self) -> Option<IpAddr> {
        self.addresses.first().copied()
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// ICMP workers actually launched: never more than there are addresses.
    pub fn icmp_pool_size(&self) -> usize {
        self.icmp_workers.min(self.addresses.len())
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primary_address() {
            Some(primary) if self.domain == primary.to_string() => write!(f, "{}", primary),
            Some(primary) => write!(f, "{} ({})", self.domain, primary),
            None => write!(f, "{}", self.domain),
        }
    }
}

#[cfg(test)]
impl ScanTarget {
    /// A target that skipped resolution, for exercising the no-address path.
    pub(crate) fn unresolved(domain: &str, ports: Vec<Port>) -> Self {
        Self {
            domain: domain.to_string(),
            addresses: Vec::new(),
            ports,
            workers: 1,
            icmp_workers: 1,
        }
    }
}

#[derive(Deserialize)]
struct ScanTargetFields {
    domain: String,
    addresses: Vec<IpAddr>,
    ports: Vec<Port>,
    workers: usize,
    icmp_workers: usize,
}

impl TryFrom<ScanTargetFields> for ScanTarget {
    type Error = ResolutionError;

    fn try_from(fields: ScanTargetFields) -> Result<Self, Self::Error> {
        Ok(Self::new(fields.domain, fields.addresses, fields.workers)?
            .with_ports(fields.ports)
            .with_icmp_workers(fields.icmp_workers))
    }
}

/// An unresolved target as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// An IP literal; resolves to itself.
    Address(IpAddr),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    pub fn parse(s: &str) -> Result<Self, ResolutionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ResolutionError::EmptyTarget);
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Address(ip));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(ResolutionError::InvalidHostname(s.to_string()))
    }

    /// Resolve to every address the resolver returns, in answer order.
    pub async fn resolve(&self) -> Result<Vec<IpAddr>, ResolutionError> {
        match self {
            Self::Address(ip) => Ok(vec![*ip]),

            Self::Hostname(hostname) => {
                let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|_| {
                    TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
                });

                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    ResolutionError::LookupFailed(hostname.clone(), e.to_string())
                })?;

                let mut ips: Vec<IpAddr> = Vec::new();
                for ip in response.iter() {
                    if !ips.contains(&ip) {
                        ips.push(ip);
                    }
                }
                if ips.is_empty() {
                    return Err(ResolutionError::NoAddresses(hostname.clone()));
                }

                debug!(host = %hostname, addresses = ?ips, "resolved target");
                Ok(ips)
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(ip) => write!(f, "{}", ip),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Check if a string is a syntactically valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.len() > 253 {
        return false;
    }

    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.starts_with(|c: char| c.is_ascii_alphanumeric())
            && label.ends_with(|c: char| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("192.168.1.1").unwrap();
        assert!(matches!(spec, TargetSpec::Address(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_ipv6() {
        let spec = TargetSpec::parse("::1").unwrap();
        assert!(matches!(spec, TargetSpec::Address(IpAddr::V6(_))));
    }

    #[test]
    fn test_parse_hostname() {
        assert_eq!(
            TargetSpec::parse(" example.com ").unwrap(),
            TargetSpec::Hostname("example.com".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            TargetSpec::parse(""),
            Err(ResolutionError::EmptyTarget)
        ));
        assert!(matches!(
            TargetSpec::parse("-bad-.com"),
            Err(ResolutionError::InvalidHostname(_))
        ));
        assert!(matches!(
            TargetSpec::parse("has space.com"),
            Err(ResolutionError::InvalidHostname(_))
        ));
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("example.com."));
        assert!(is_valid_hostname("my-server"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("."));
        assert!(!is_valid_hostname("a..b"));
    }

    #[tokio::test]
    async fn test_ip_literal_resolves_to_itself() {
        let target = ScanTarget::resolve("127.0.0.1", 10).await.unwrap();
        assert_eq!(target.addresses(), &[IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        assert_eq!(target.domain(), "127.0.0.1");
        assert_eq!(target.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_empty_addresses_rejected() {
        let err = ScanTarget::new("nowhere.invalid", Vec::new(), 10).unwrap_err();
        assert!(matches!(err, ResolutionError::NoAddresses(d) if d == "nowhere.invalid"));
    }

    #[test]
    fn test_defaults_and_overrides() {
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let target = ScanTarget::new("localhost", vec![ip], 0).unwrap();
        assert_eq!(target.ports().len(), 65535);
        assert_eq!(target.workers(), 1);
        assert_eq!(target.icmp_pool_size(), 1);
        assert_eq!(target.to_string(), "localhost (127.0.0.1)");

        let ports = vec![Port::new(80).unwrap(), Port::new(9999).unwrap()];
        let target = target.with_ports(ports.clone()).with_icmp_workers(8);
        assert_eq!(target.ports(), ports.as_slice());
        assert_eq!(target.icmp_pool_size(), 1);
    }

    #[test]
    fn test_deserialize_rejects_empty_addresses() {
        let json = r#"{"domain":"x","addresses":[],"ports":[80],"workers":1,"icmp_workers":1}"#;
        let err = serde_json::from_str::<ScanTarget>(json).unwrap_err();
        assert!(err.to_string().contains("no addresses"));
    }

    #[test]
    fn test_deserialize_round_trips_through_new() {
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let target = ScanTarget::new("localhost", vec![ip], 4)
            .unwrap()
            .with_ports(vec![Port::new(22).unwrap()])
            .with_icmp_workers(2);

        let json = serde_json::to_string(&target).unwrap();
        let back: ScanTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(back, target);
        assert_eq!(back.primary_address(), Some(ip));
    }

    #[test]
    fn test_unresolved_target_has_no_primary_address() {
        let target = ScanTarget::unresolved("nowhere.invalid", Vec::new());
        assert_eq!(target.primary_address(), None);
        assert_eq!(target.to_string(), "nowhere.invalid");
    }
}
