//! JSON output format.

use crate::error::ReportResult;
use crate::scanner::ScanOutcome;
use std::io::{self, Write};

/// Write the outcome as pretty-printed JSON.
pub fn write_json<W: Write>(outcome: &ScanOutcome, out: &mut W) -> ReportResult<()> {
    serde_json::to_writer_pretty(&mut *out, outcome)?;
    writeln!(out)?;
    Ok(())
}

/// Print results in JSON format.
pub fn print_json(outcome: &ScanOutcome) -> ReportResult<()> {
    write_json(outcome, &mut io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_outcome;

    #[test]
    fn test_json_fields() {
        let mut buf = Vec::new();
        write_json(&sample_outcome(), &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["domain"], "localhost");
        assert_eq!(value["open_tcp"][1]["service"], "HTTP");
        assert_eq!(value["open_udp"][0]["protocol"], "UDP");
        assert_eq!(value["reachability"][1]["reachability"], "Unreachable");
        assert!(value.get("workers").is_none());
    }
}
