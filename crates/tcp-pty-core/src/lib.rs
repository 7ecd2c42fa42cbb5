//! tcp-pty-core: shared pieces of the TCP/PTY tunnel.
//!
//! Provides endpoint argument validation, the reliable writer, an async
//! stream over terminal descriptors, and the I/O bridge that both the client
//! and the server run for the lifetime of their single session.

pub mod bridge;
pub mod endpoint;
pub mod error;
pub mod fd;
pub mod writer;

// Re-export commonly used items at crate root.
pub use bridge::{Bridge, BridgeEnd, BridgeReport, Control, Unwatched, Watch, CHUNK_SIZE, DEFAULT_TICK};
pub use endpoint::{parse_ipv4, parse_port, LOOPBACK};
pub use error::{TcpPtyError, TcpPtyResult};
pub use fd::FdStream;
pub use writer::write_fully;
