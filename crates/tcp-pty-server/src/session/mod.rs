//! Session resources: the PTY pair and the shell process attached to it.

pub mod child;
pub mod pty;

pub use child::SessionChild;
pub use pty::PtyPair;
