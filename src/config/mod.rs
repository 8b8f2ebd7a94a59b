//! Configuration management for portsweep.
//!
//! XDG-located JSON settings, overridden by command-line flags.

mod settings;

pub use settings::{AppSettings, OutputFormat, Paths};
