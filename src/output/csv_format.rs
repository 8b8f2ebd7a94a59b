//! CSV output format.

use crate::error::ReportResult;
use crate::scanner::ScanOutcome;
use std::io::{self, Write};

/// Write one row per open port and per probed address.
pub fn write_csv<W: Write>(outcome: &ScanOutcome, out: W) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["kind", "port", "address", "status", "service"])?;

    for record in outcome.open_tcp.iter().chain(&outcome.open_udp) {
        let protocol = record.protocol.to_string();
        let port = record.port.to_string();
        wtr.write_record([
            protocol.as_str(),
            port.as_str(),
            "",
            "Open",
            record.service.as_str(),
        ])?;
    }

    for record in &outcome.reachability {
        let address = record.address.to_string();
        let reachability = record.reachability.to_string();
        wtr.write_record([
            "ICMP",
            "",
            address.as_str(),
            reachability.as_str(),
            "",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print results in CSV format.
pub fn print_csv(outcome: &ScanOutcome) -> ReportResult<()> {
    write_csv(outcome, io::stdout().lock())
}
