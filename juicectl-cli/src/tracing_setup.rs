//! Tracing setup for juicectl
//!
//! Usage:
//!   juicectl --debug ...                 # Debug logging
//!   RUST_LOG=juicectl_core=debug juicectl # Fine-grained log control
//!
//! Logs always go to stderr so stdout carries only the report.

use std::io::IsTerminal;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Use `debug` level unless RUST_LOG is explicitly set
    pub debug: bool,
}

impl TracingConfig {
    fn filter(&self) -> EnvFilter {
        let default = if self.debug { "debug" } else { "info" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    }
}

pub fn init(config: &TracingConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.debug) // Show targets in debug mode
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
