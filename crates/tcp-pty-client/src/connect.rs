//! `tcp-pty-client <ip> <port>`: bridge the operator's terminal to a server.
//!
//! Connects, switches the terminal to raw mode, reopens the terminal device
//! as the local endpoint and runs the bridge until either side closes. The
//! terminal is restored before this function returns, on every path.

use std::os::fd::AsFd;

use anyhow::{Context, Result};
use tcp_pty_core::{Bridge, BridgeReport, FdStream, Unwatched};
use tokio::net::TcpStream;
use tracing::info;

use crate::config::ClientConfig;
use crate::terminal::{open_terminal, RawModeGuard};

/// Run one interactive session against `config.remote`.
pub async fn run(config: &ClientConfig) -> Result<BridgeReport> {
    let mut transport = TcpStream::connect(config.remote)
        .await
        .context("connect")?;
    println!("Connected to {}", config.remote);
    info!(remote = %config.remote, "connected");

    let stdin = std::io::stdin();
    let _raw = RawModeGuard::enter(stdin.as_fd())?;

    let tty = open_terminal(stdin.as_fd())?;
    let mut local = FdStream::new(tty).context("register terminal")?;

    let report = Bridge::new(config.tick)
        .run(&mut transport, &mut local, &mut Unwatched)
        .await;
    info!(
        end = ?report.end,
        inbound = report.inbound,
        outbound = report.outbound,
        "session ended"
    );

    Ok(report)
}
