//! Command-line endpoint validation.
//!
//! Both binaries reject a bad port or address before any socket is created.

use std::net::Ipv4Addr;

use crate::error::{TcpPtyError, TcpPtyResult};

/// Address the server binds to. The session is never exposed beyond loopback.
pub const LOOPBACK: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Parse a TCP port argument. Zero and anything above 65535 are rejected.
pub fn parse_port(s: &str) -> TcpPtyResult<u16> {
    let value: u32 = s
        .trim()
        .parse()
        .map_err(|_| TcpPtyError::InvalidPort(s.to_string()))?;
    match u16::try_from(value) {
        Ok(0) | Err(_) => Err(TcpPtyError::InvalidPort(s.to_string())),
        Ok(port) => Ok(port),
    }
}

/// Parse a dotted-quad IPv4 address argument.
pub fn parse_ipv4(s: &str) -> TcpPtyResult<Ipv4Addr> {
    s.parse()
        .map_err(|_| TcpPtyError::InvalidAddress(s.to_string()))
}
