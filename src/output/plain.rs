//! Plain text console output.
//!
//! Colors come from `console` and switch off automatically when stdout is
//! not a terminal.

use crate::scanner::{Reachability, ScanOutcome, ServiceRecord};
use crate::types::ScanTarget;
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write the human-readable summary of a finished scan.
pub fn write_plain<W: Write>(outcome: &ScanOutcome, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                   {} Scan Results",
        style("portsweep").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Target:").bold(), outcome.domain)?;
    let addresses: Vec<String> = outcome.addresses.iter().map(|a| a.to_string()).collect();
    writeln!(
        out,
        "  {} {}",
        style("Addresses:").bold(),
        addresses.join(", ")
    )?;
    writeln!(
        out,
        "  {} {}",
        style("Scan ID:").bold(),
        style(outcome.id.short()).dim()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} ports in {:.2}s, each probed over TCP or UDP",
        style("Statistics:").bold(),
        outcome.ports_scanned,
        outcome.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "              TCP {} open, {} closed",
        style(outcome.tally.tcp_open).green().bold(),
        style(outcome.tally.tcp_closed).red()
    )?;
    writeln!(
        out,
        "              UDP {} open, {} closed",
        style(outcome.tally.udp_open).green().bold(),
        style(outcome.tally.udp_closed).red()
    )?;
    writeln!(out)?;

    write_port_table(out, "TCP", &outcome.open_tcp)?;
    write_port_table(out, "UDP", &outcome.open_udp)?;

    writeln!(out, "  {}", style("ICMP").bold())?;
    if outcome.reachability.is_empty() {
        writeln!(out, "    {}", style("No addresses probed.").dim())?;
    }
    for record in &outcome.reachability {
        let status_style = match record.reachability {
            Reachability::Reachable => Style::new().green().bold(),
            Reachability::Unreachable => Style::new().yellow(),
        };
        writeln!(
            out,
            "    {:<40}  {}",
            record.address,
            status_style.apply_to(record.reachability)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

fn write_port_table<W: Write>(
    out: &mut W,
    label: &str,
    records: &[ServiceRecord],
) -> io::Result<()> {
    writeln!(out, "  {}", style(label).bold())?;
    if records.is_empty() {
        writeln!(out, "    {}", style("No open ports.").dim())?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    writeln!(
        out,
        "  {:>6}  {:^8}  {}",
        style("PORT").bold(),
        style("STATE").bold(),
        style("SERVICE").bold()
    )?;
    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    for record in records {
        writeln!(
            out,
            "  {:>6}  {:^8}  {}",
            record.port,
            style("open").green().bold(),
            record.service
        )?;
    }
    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    writeln!(out)?;
    Ok(())
}

/// Print results in human-readable plain text format.
pub fn print_plain(outcome: &ScanOutcome) -> io::Result<()> {
    write_plain(outcome, &mut io::stdout().lock())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &ScanTarget) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(target).white().bold()
    );
    println!(
        "{} Sweeping {} ports, shared between {} TCP and {} UDP workers",
        style("•").dim(),
        style(target.ports().len()).white().bold(),
        target.workers(),
        target.workers()
    );
    println!(
        "{} Pinging {} address(es) with {} ICMP workers",
        style("•").dim(),
        target.addresses().len(),
        target.icmp_pool_size()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}
