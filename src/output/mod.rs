//! Output formatting module.
//!
//! The text report file plus plain, JSON and CSV renderings on stdout.

mod csv_format;
mod json_format;
mod plain;
mod report;

pub use csv_format::{print_csv, write_csv};
pub use json_format::{print_json, write_json};
pub use plain::{
    print_error, print_plain, print_scan_header, print_success, print_warning,
    write_plain,
};
pub use report::{render_report, write_report, ICMP_SECTION, TCP_SECTION, UDP_SECTION};

use crate::config::OutputFormat;
use crate::error::ReportResult;
use crate::scanner::ScanOutcome;

/// Format and print scan results according to the specified format.
pub fn print_results(outcome: &ScanOutcome, format: OutputFormat) -> ReportResult<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(outcome)?,
        OutputFormat::Json => json_format::print_json(outcome)?,
        OutputFormat::Csv => csv_format::print_csv(outcome)?,
    }
    Ok(())
}
