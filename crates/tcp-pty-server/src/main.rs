//! tcp-pty-server: expose a shell on a fresh PTY over a loopback socket.
//!
//! Accepts a single connection, runs the bridge for its lifetime, reaps the
//! shell and exits.

mod config;
mod lifecycle;
mod server;
mod session;

use clap::Parser;
use config::{ServerConfig, DEFAULT_SHELL, DEFAULT_TICK_MS};
use tcp_pty_core::parse_port;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// tcp-pty-server: shell on a PTY over TCP
#[derive(Parser, Debug)]
#[command(name = "tcp-pty-server", version, about = "Serve one shell session on a PTY over a loopback TCP socket")]
struct Cli {
    /// Listen port (bound on 127.0.0.1)
    #[arg(value_parser = parse_port)]
    port: u16,

    /// Shell program to run on the PTY, looked up through PATH
    #[arg(long, default_value = DEFAULT_SHELL)]
    shell: String,

    /// Liveness tick of the bridge loop, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        std::process::exit(code);
    });

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cli.port,
        "starting tcp-pty-server"
    );

    let result = match ServerConfig::new(cli.port, &cli.shell, cli.tick_ms) {
        Ok(cfg) => server::run(&cfg).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => info!("tcp-pty-server stopped"),
        Err(e) => {
            debug!(error = ?e, "server failed");
            eprintln!("tcp-pty-server: {e:#}");
            std::process::exit(1);
        }
    }
}
