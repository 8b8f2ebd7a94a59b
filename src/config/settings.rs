//! Application settings and paths.
//!
//! Settings live in a JSON file under the XDG config directory
//! (`~/.config/portsweep/settings.json` on Linux). A missing file means
//! defaults; any field left out of the file takes its default too.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{ScanConfig, DEFAULT_UDP_PAYLOAD};
use crate::types::{DEFAULT_ICMP_WORKERS, DEFAULT_WORKERS};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portsweep", "portsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Report rendering written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable console summary
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// TCP workers, and separately UDP workers.
    pub workers: usize,
    /// Size of the ICMP worker pool.
    pub icmp_workers: usize,
    pub tcp_timeout_ms: u64,
    pub udp_timeout_ms: u64,
    pub icmp_timeout_ms: u64,
    /// UTF-8 payload sent to every UDP port.
    pub udp_payload: String,
    /// Where the text report is written.
    pub output_file: PathBuf,
    pub output_format: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            icmp_workers: DEFAULT_ICMP_WORKERS,
            tcp_timeout_ms: 10_000,
            udp_timeout_ms: 5_000,
            icmp_timeout_ms: 5_000,
            udp_payload: String::from_utf8_lossy(DEFAULT_UDP_PAYLOAD).into_owned(),
            output_file: PathBuf::from("output.txt"),
            output_format: OutputFormat::Plain,
        }
    }
}

impl AppSettings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; the default location may be absent.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let file = Paths::discover()?.settings_file();
                if !file.exists() {
                    debug!(path = %file.display(), "no settings file, using defaults");
                    return Ok(Self::default());
                }
                Self::load_from(&file)
            }
        }
    }

    /// Load settings from a specific file.
    ///
    /// Values are not validated here: command-line flags may still replace
    /// them, so callers run [`AppSettings::validate`] on the merged result.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Reject values that would make a scan impossible.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        if self.icmp_workers == 0 {
            return Err(ConfigError::Invalid(
                "icmp_workers must be at least 1".to_string(),
            ));
        }
        for (name, ms) in [
            ("tcp_timeout_ms", self.tcp_timeout_ms),
            ("udp_timeout_ms", self.udp_timeout_ms),
            ("icmp_timeout_ms", self.icmp_timeout_ms),
        ] {
            if ms == 0 {
                return Err(ConfigError::Invalid(format!("{} must be non-zero", name)));
            }
        }
        Ok(())
    }

    /// Probe settings derived from these settings.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_tcp_timeout(Duration::from_millis(self.tcp_timeout_ms))
            .with_udp_timeout(Duration::from_millis(self.udp_timeout_ms))
            .with_icmp_timeout(Duration::from_millis(self.icmp_timeout_ms))
            .with_udp_payload(self.udp_payload.as_bytes())
    }
}
