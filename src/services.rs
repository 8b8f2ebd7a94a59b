//! Service detection based on well-known port numbers.
//!
//! Maps a port number to a canonical service name. The table is built once
//! and only read afterwards, so workers share it behind an `Arc` without
//! locking.

use crate::scanner::{Protocol, ServiceRecord};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Name reported for ports missing from the table.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Detection response when the table knows the port.
pub const SERVICE_DETECTED: &str = "Service Detected";

/// Detection response when it does not.
pub const SERVICE_NOT_DETECTED: &str = "Service Not Detected";

const WELL_KNOWN: &[(u16, &str)] = &[
    (1, "tcpmux"),
    (7, "echo"),
    (9, "discard"),
    (11, "systat"),
    (13, "daytime"),
    (17, "qotd"),
    (19, "chargen"),
    (20, "FTP-Data"),
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (37, "time"),
    (43, "WHOIS"),
    (49, "TACACS"),
    (53, "DNS"),
    (67, "DHCP-Server"),
    (68, "DHCP-Client"),
    (69, "TFTP"),
    (79, "finger"),
    (80, "HTTP"),
    (88, "Kerberos"),
    (110, "POP3"),
    (111, "RPCbind"),
    (113, "ident"),
    (119, "NNTP"),
    (123, "NTP"),
    (135, "MSRPC"),
    (137, "NetBIOS-NS"),
    (138, "NetBIOS-DGM"),
    (139, "NetBIOS-SSN"),
    (143, "IMAP"),
    (161, "SNMP"),
    (162, "SNMP-Trap"),
    (179, "BGP"),
    (194, "IRC"),
    (389, "LDAP"),
    (443, "HTTPS"),
    (445, "Microsoft-DS"),
    (464, "kpasswd"),
    (465, "SMTPS"),
    (500, "ISAKMP"),
    (513, "rlogin"),
    (514, "syslog"),
    (515, "printer"),
    (520, "RIP"),
    (548, "AFP"),
    (554, "RTSP"),
    (587, "Submission"),
    (631, "IPP"),
    (636, "LDAPS"),
    (873, "rsync"),
    (989, "FTPS-Data"),
    (990, "FTPS"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1080, "SOCKS"),
    (1194, "OpenVPN"),
    (1433, "MSSQL"),
    (1434, "MSSQL-Monitor"),
    (1521, "Oracle"),
    (1701, "L2TP"),
    (1723, "PPTP"),
    (1812, "RADIUS"),
    (1813, "RADIUS-Accounting"),
    (1883, "MQTT"),
    (1900, "SSDP"),
    (2049, "NFS"),
    (2181, "ZooKeeper"),
    (2375, "Docker"),
    (2376, "Docker-TLS"),
    (3128, "Squid"),
    (3268, "LDAP-GC"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (3478, "STUN"),
    (3690, "SVN"),
    (4369, "EPMD"),
    (5060, "SIP"),
    (5061, "SIP-TLS"),
    (5222, "XMPP-Client"),
    (5269, "XMPP-Server"),
    (5353, "mDNS"),
    (5432, "PostgreSQL"),
    (5672, "AMQP"),
    (5900, "VNC"),
    (5984, "CouchDB"),
    (6379, "Redis"),
    (6443, "Kubernetes-API"),
    (6667, "IRC"),
    (8000, "HTTP-Alt"),
    (8008, "HTTP-Alt"),
    (8080, "HTTP-Proxy"),
    (8443, "HTTPS-Alt"),
    (8888, "HTTP-Alt"),
    (9042, "Cassandra"),
    (9090, "Prometheus"),
    (9092, "Kafka"),
    (9200, "Elasticsearch"),
    (9418, "Git"),
    (10000, "Webmin"),
    (11211, "Memcached"),
    (27017, "MongoDB"),
];

static WELL_KNOWN_TABLE: LazyLock<ServiceTable> =
    LazyLock::new(|| WELL_KNOWN.iter().copied().collect());

/// Immutable port → service name table.
#[derive(Debug, Clone, Default)]
pub struct ServiceTable {
    names: HashMap<u16, String>,
}

impl ServiceTable {
    /// The built-in table of well-known ports.
    pub fn well_known() -> &'static ServiceTable {
        &WELL_KNOWN_TABLE
    }

    /// Look up the service name for a port.
    pub fn name(&self, port: u16) -> Option<&str> {
        self.names.get(&port).map(String::as_str)
    }

    /// Build the record emitted for a confirmed-open port.
    pub fn detect(&self, port: u16, protocol: Protocol) -> ServiceRecord {
        match self.name(port) {
            Some(name) => ServiceRecord {
                port,
                protocol,
                service: name.to_string(),
                response: SERVICE_DETECTED.to_string(),
            },
            None => ServiceRecord {
                port,
                protocol,
                service: UNKNOWN_SERVICE.to_string(),
                response: SERVICE_NOT_DETECTED.to_string(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u16, S)> for ServiceTable {
    fn from_iter<I: IntoIterator<Item = (u16, S)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|(p, s)| (p, s.into())).collect(),
        }
    }
}
