//! tcp-pty-client: attach the local terminal to a remote PTY over TCP.
//!
//! Every byte typed is forwarded verbatim to the server and every byte the
//! remote shell emits is written verbatim to the terminal.

mod config;
mod connect;
mod terminal;

use std::net::Ipv4Addr;

use clap::Parser;
use config::{ClientConfig, DEFAULT_TICK_MS};
use tcp_pty_core::{parse_ipv4, parse_port};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// tcp-pty-client: raw terminal over TCP
#[derive(Parser, Debug)]
#[command(name = "tcp-pty-client", version, about = "Attach the local terminal to a tcp-pty-server session")]
struct Cli {
    /// Server IPv4 address
    #[arg(value_parser = parse_ipv4)]
    address: Ipv4Addr,

    /// Server port
    #[arg(value_parser = parse_port)]
    port: u16,

    /// Liveness tick of the bridge loop, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        let code = if e.use_stderr() { 1 } else { 0 };
        let _ = e.print();
        std::process::exit(code);
    });

    // Logs share the terminal with the session, so they go to stderr and
    // default to warnings only.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = ClientConfig::new(cli.address, cli.port, cli.tick_ms);
    if let Err(e) = connect::run(&config).await {
        debug!(error = ?e, "client failed");
        eprintln!("tcp-pty-client: {e:#}");
        std::process::exit(1);
    }
}
