//! Client configuration resolved from the command line.
//!
//! There is no config file; every setting comes from a CLI argument. Ports and
//! ticks are range-checked by the argument parser before they get here.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use tcp_pty_core::DEFAULT_TICK;

/// Default liveness tick of the bridge loop, in milliseconds.
pub const DEFAULT_TICK_MS: u64 = DEFAULT_TICK.as_millis() as u64;

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server to connect to.
    pub remote: SocketAddrV4,
    /// Liveness tick of the bridge loop.
    pub tick: Duration,
}

impl ClientConfig {
    pub fn new(address: Ipv4Addr, port: u16, tick_ms: u64) -> Self {
        Self {
            remote: SocketAddrV4::new(address, port),
            tick: Duration::from_millis(tick_ms),
        }
    }
}
