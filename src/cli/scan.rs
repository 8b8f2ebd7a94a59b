//! The scan command: merge settings, resolve, sweep, report.

use crate::config::{AppSettings, OutputFormat};
use crate::error::CliResult;
use crate::output;
use crate::scanner;
use crate::types::{PortSpec, ScanTarget};
use clap::Args;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Scan options. Every flag left unset falls back to the settings file.
#[derive(Args, Debug, Default)]
pub struct ScanCommand {
    /// Hostname or IP address to scan; prompted for on stdin when omitted
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// TCP workers, and separately UDP workers, sharing the port queue
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub workers: Option<u64>,

    /// Size of the ICMP worker pool
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub icmp_workers: Option<u64>,

    /// Ports to scan (e.g., "80", "22,80,443", "1-1024"); all ports by default
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Path of the text report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Format of the results printed to stdout
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// TCP connect timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub tcp_timeout: Option<u64>,

    /// UDP reply timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub udp_timeout: Option<u64>,

    /// ICMP echo timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub icmp_timeout: Option<u64>,
}

impl ScanCommand {
    /// Lay the flags that were given over `settings`.
    pub fn apply(&self, mut settings: AppSettings) -> AppSettings {
        if let Some(workers) = self.workers {
            settings.workers = workers as usize;
        }
        if let Some(icmp_workers) = self.icmp_workers {
            settings.icmp_workers = icmp_workers as usize;
        }
        if let Some(ref output) = self.output {
            settings.output_file = output.clone();
        }
        if let Some(format) = self.format {
            settings.output_format = format;
        }
        if let Some(ms) = self.tcp_timeout {
            settings.tcp_timeout_ms = ms;
        }
        if let Some(ms) = self.udp_timeout {
            settings.udp_timeout_ms = ms;
        }
        if let Some(ms) = self.icmp_timeout {
            settings.icmp_timeout_ms = ms;
        }
        settings
    }

    fn port_spec(&self) -> CliResult<PortSpec> {
        match self.ports {
            Some(ref spec) => Ok(spec.parse()?),
            None => Ok(PortSpec::full()),
        }
    }

    /// Execute the scan command.
    pub async fn execute(&self, config: Option<&Path>, quiet: bool) -> CliResult<()> {
        let settings = self.apply(AppSettings::load(config)?);
        settings.validate()?;
        let ports = self.port_spec()?.to_ports();

        let raw_target = match self.target {
            Some(ref target) => target.clone(),
            None => prompt_target(&mut io::stdin().lock(), &mut io::stdout())?,
        };

        let target = ScanTarget::resolve(&raw_target, settings.workers)
            .await?
            .with_icmp_workers(settings.icmp_workers)
            .with_ports(ports);
        info!(target = %target, addresses = target.addresses().len(), "target resolved");

        if !is_root() {
            output::print_warning(
                "not running as root; ICMP echo needs raw sockets or net.ipv4.ping_group_range, \
                 otherwise every address reports Unreachable.",
            );
        }

        let plain = settings.output_format == OutputFormat::Plain;
        if !quiet && plain {
            output::print_scan_header(&target);
        }

        let mut scan_config = settings.scan_config();
        if !quiet {
            scan_config = scan_config.with_progress();
        }

        let outcome = scanner::scan(&target, &scan_config).await?;

        output::print_results(&outcome, settings.output_format)?;

        match output::write_report(&outcome, &settings.output_file) {
            Ok(()) if !quiet && plain => output::print_success(&format!(
                "Report written to {}",
                settings.output_file.display()
            )),
            Ok(()) => {}
            Err(e) => {
                warn!(error = %e, "report not written");
                output::print_error(&e.to_string());
            }
        }

        Ok(())
    }
}

/// Ask for a target on `output` and read one line from `input`.
pub fn prompt_target<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<String> {
    write!(output, "Enter domain: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Check if running with root/admin privileges.
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CliError, ConfigError};
    use std::io::Cursor;

    #[test]
    fn test_prompt_reads_trimmed_line() {
        let mut input = Cursor::new(b"  example.com \nignored\n".to_vec());
        let mut shown = Vec::new();

        let target = prompt_target(&mut input, &mut shown).unwrap();
        assert_eq!(target, "example.com");
        assert_eq!(shown, b"Enter domain: ");
    }

    #[test]
    fn test_prompt_at_eof_is_empty() {
        let mut input = Cursor::new(Vec::new());
        let mut shown = Vec::new();
        assert_eq!(prompt_target(&mut input, &mut shown).unwrap(), "");
    }

    #[test]
    fn test_flags_override_settings() {
        let command = ScanCommand {
            workers: Some(7),
            udp_timeout: Some(300),
            format: Some(OutputFormat::Csv),
            ..ScanCommand::default()
        };
        let settings = command.apply(AppSettings::default());

        assert_eq!(settings.workers, 7);
        assert_eq!(settings.udp_timeout_ms, 300);
        assert_eq!(settings.output_format, OutputFormat::Csv);
        assert_eq!(settings.tcp_timeout_ms, 10_000);
        assert_eq!(settings.output_file, PathBuf::from("output.txt"));
    }

    #[test]
    fn test_flag_repairs_invalid_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        std::fs::write(&config, r#"{"workers": 0, "icmp_timeout_ms": 0}"#).unwrap();

        let command = ScanCommand {
            workers: Some(8),
            icmp_timeout: Some(750),
            ..ScanCommand::default()
        };
        let settings = command.apply(AppSettings::load(Some(&config)).unwrap());

        assert_eq!(settings.workers, 8);
        assert_eq!(settings.icmp_timeout_ms, 750);
        assert!(settings.validate().is_ok());

        let untouched = ScanCommand::default().apply(AppSettings::load(Some(&config)).unwrap());
        assert!(matches!(untouched.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_port_spec_defaults_to_full_range() {
        let spec = ScanCommand::default().port_spec().unwrap();
        assert_eq!(spec.to_ports().len(), 65535);

        let command = ScanCommand {
            ports: Some("22,80-81".to_string()),
            ..ScanCommand::default()
        };
        let ports: Vec<u16> = command
            .port_spec()
            .unwrap()
            .to_ports()
            .into_iter()
            .map(u16::from)
            .collect();
        assert_eq!(ports, vec![22, 80, 81]);

        let command = ScanCommand {
            ports: Some("0".to_string()),
            ..ScanCommand::default()
        };
        assert!(matches!(command.port_spec(), Err(CliError::Port(_))));
    }

    #[tokio::test]
    async fn test_zero_timeout_fails_before_scanning() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        std::fs::write(&config, "{}").unwrap();

        let command = ScanCommand {
            target: Some("127.0.0.1".to_string()),
            tcp_timeout: Some(0),
            ..ScanCommand::default()
        };
        let err = command.execute(Some(&config), true).await.unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::Invalid(_))));
    }
}
