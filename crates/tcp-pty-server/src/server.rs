//! One-shot server: listen on loopback, accept a single connection, and
//! bridge it to a shell on a fresh PTY until the session ends.

use std::io;

use anyhow::{Context, Result};
use nix::errno::Errno;
use tcp_pty_core::{write_fully, Bridge, FdStream, TcpPtyError};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::lifecycle::{watch_signals, LifecycleController};
use crate::session::{PtyPair, SessionChild};

/// Bind the listening socket with address reuse and a backlog of one.
fn listen(config: &ServerConfig) -> Result<TcpListener> {
    let socket = TcpSocket::new_v4().context("socket")?;
    socket
        .set_reuseaddr(true)
        .context("setsockopt(SO_REUSEADDR)")?;
    socket.bind(config.listen_addr()).context("bind")?;
    socket.listen(1).context("listen")
}

/// The line a shell that failed to start leaves on its terminal.
fn exec_diagnostic(err: &io::Error) -> String {
    let reason = match err.raw_os_error() {
        Some(code) => Errno::from_raw(code).desc().to_string(),
        None => err.to_string(),
    };
    format!("exec: {reason}\r\n")
}

/// Hand the peer the diagnostic of a shell that never started, then close.
///
/// From the peer's side this looks like a shell that printed an error and
/// exited, so the session ends normally.
async fn report_exec_failure(mut transport: TcpStream, program: &str, err: &io::Error) {
    warn!(program, error = %err, "session process failed to start");
    let diagnostic = exec_diagnostic(err);
    if let Err(e) = write_fully(&mut transport, diagnostic.as_bytes()).await {
        debug!(error = %e, "could not deliver exec failure to peer");
    }
    if let Err(e) = transport.shutdown().await {
        debug!(error = %e, "transport shutdown failed");
    }
}

/// Serve exactly one session, returning once it is over and the session
/// process has been reaped.
pub async fn run(config: &ServerConfig) -> Result<()> {
    let listener = listen(config)?;
    println!("Listening on {}", config.listen_addr());
    info!(addr = %config.listen_addr(), "listening");

    let (mut transport, peer) = listener.accept().await.context("accept")?;
    drop(listener);
    info!(%peer, "accepted connection");

    let events = watch_signals().context("signal setup")?;

    let pty = PtyPair::open()?;
    let slave = pty
        .open_slave()
        .with_context(|| format!("open {}", pty.slave_path().display()))?;
    let child = match SessionChild::spawn(&config.shell, slave) {
        Ok(child) => child,
        Err(TcpPtyError::Exec { program, source }) => {
            report_exec_failure(transport, &program, &source).await;
            return Ok(());
        }
        Err(e) => return Err(e).with_context(|| format!("spawn {}", config.shell)),
    };
    info!(pid = child.id(), slave = %pty.slave_path().display(), "session started");

    let mut local = FdStream::new(pty.into_master()).context("register PTY master")?;
    let mut controller = LifecycleController::new(events, child);

    let report = Bridge::new(config.tick)
        .run(&mut transport, &mut local, &mut controller)
        .await;
    info!(
        end = ?report.end,
        inbound = report.inbound,
        outbound = report.outbound,
        shutdown = ?controller.shutdown_requested(),
        child_exited = controller.child_exited(),
        "session ended"
    );

    let status = controller.finish().context("reap session process")?;
    info!(%status, "session process finished");

    Ok(())
}
