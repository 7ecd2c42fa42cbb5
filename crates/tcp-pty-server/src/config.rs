//! Server configuration resolved from the command line.

use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;

use anyhow::Result;
use tcp_pty_core::{DEFAULT_TICK, LOOPBACK};

/// Default liveness tick of the bridge loop, in milliseconds.
pub const DEFAULT_TICK_MS: u64 = DEFAULT_TICK.as_millis() as u64;

/// Shell started on the PTY when none is given. Resolved through `PATH`.
pub const DEFAULT_SHELL: &str = "bash";

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Program executed as the session process.
    pub shell: String,
    /// Liveness tick of the bridge loop.
    pub tick: Duration,
}

impl ServerConfig {
    /// `port` and `tick_ms` arrive range-checked from the argument parser;
    /// only the shell name needs checking here.
    pub fn new(port: u16, shell: &str, tick_ms: u64) -> Result<Self> {
        if shell.trim().is_empty() {
            anyhow::bail!("empty shell program");
        }
        Ok(Self {
            port,
            shell: shell.to_string(),
            tick: Duration::from_millis(tick_ms),
        })
    }

    /// The listening address. Sessions are only ever offered on loopback.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(LOOPBACK, self.port))
    }
}
