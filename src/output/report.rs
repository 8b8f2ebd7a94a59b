//! The text report artifact.
//!
//! Three sections in fixed order, one line per record:
//!
//! ```text
//! Open TCP Ports with Services:
//! Port 80 (TCP) is Open, Service: HTTP
//! Open UDP Ports with Services:
//! Port 53 (UDP) is Open, Service: DNS
//! ICMP Reachability Results:
//! IP: 93.184.216.34, Response: Reachable
//! ```

use crate::error::{ReportError, ReportResult};
use crate::scanner::ScanOutcome;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const TCP_SECTION: &str = "Open TCP Ports with Services:";
pub const UDP_SECTION: &str = "Open UDP Ports with Services:";
pub const ICMP_SECTION: &str = "ICMP Reachability Results:";

/// Render the report into any writer.
pub fn render_report<W: Write>(outcome: &ScanOutcome, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", TCP_SECTION)?;
    for record in &outcome.open_tcp {
        writeln!(out, "{}", record)?;
    }

    writeln!(out, "{}", UDP_SECTION)?;
    for record in &outcome.open_udp {
        writeln!(out, "{}", record)?;
    }

    writeln!(out, "{}", ICMP_SECTION)?;
    for record in &outcome.reachability {
        writeln!(out, "{}", record)?;
    }

    Ok(())
}

/// Write the report to `path`, replacing any existing file.
pub fn write_report(outcome: &ScanOutcome, path: &Path) -> ReportResult<()> {
    let wrap = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut out = BufWriter::new(file);
    render_report(outcome, &mut out).map_err(wrap)?;
    out.flush().map_err(wrap)?;

    info!(path = %path.display(), scan = %outcome.id.short(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_outcome;

    #[test]
    fn test_report_layout() {
        let mut buf = Vec::new();
        render_report(&sample_outcome(), &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Open TCP Ports with Services:",
                "Port 22 (TCP) is Open, Service: SSH",
                "Port 80 (TCP) is Open, Service: HTTP",
                "Open UDP Ports with Services:",
                "Port 53 (UDP) is Open, Service: DNS",
                "ICMP Reachability Results:",
                "IP: 127.0.0.1, Response: Reachable",
                "IP: 192.0.2.1, Response: Unreachable",
            ]
        );
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");

        write_report(&sample_outcome(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Open TCP Ports with Services:\nPort 22 (TCP)"));
        assert!(text.ends_with("IP: 192.0.2.1, Response: Unreachable\n"));
    }

    #[test]
    fn test_unwritable_path_is_a_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("output.txt");

        let err = write_report(&sample_outcome(), &path).unwrap_err();
        assert!(matches!(err, ReportError::Write { path: p, .. } if p == path));
    }
}
