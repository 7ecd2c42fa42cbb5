//! Terminal mode control for the operator's terminal.
//!
//! Captures the terminal attributes once, switches the terminal to raw mode
//! and restores the captured attributes when the guard is dropped, whichever
//! way the session ends.

use std::fs::OpenOptions;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

use anyhow::{Context, Result};
use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg, Termios};
use nix::unistd::ttyname;
use tracing::{debug, warn};

/// RAII guard that keeps a terminal in raw mode.
///
/// The original attributes are written back exactly once, on drop.
pub struct RawModeGuard<F: AsFd> {
    fd: F,
    original: Termios,
}

impl<F: AsFd> RawModeGuard<F> {
    /// Capture the current attributes of `fd` and switch it to raw mode:
    /// no canonical line editing, no echo, no signal-generating characters.
    pub fn enter(fd: F) -> Result<Self> {
        let original = tcgetattr(fd.as_fd()).context("tcgetattr")?;

        let mut raw = original.clone();
        cfmakeraw(&mut raw);
        tcsetattr(fd.as_fd(), SetArg::TCSANOW, &raw).context("tcsetattr")?;
        debug!("terminal switched to raw mode");

        Ok(Self { fd, original })
    }
}

impl<F: AsFd> Drop for RawModeGuard<F> {
    fn drop(&mut self) {
        match tcsetattr(self.fd.as_fd(), SetArg::TCSANOW, &self.original) {
            Ok(()) => debug!("terminal attributes restored"),
            Err(e) => warn!(error = %e, "failed to restore terminal attributes"),
        }
    }
}

/// Open the terminal device behind `fd` a second time, read/write.
///
/// The new descriptor has its own open file description, so making it
/// non-blocking for the bridge leaves the inherited descriptor untouched.
pub fn open_terminal(fd: BorrowedFd<'_>) -> Result<OwnedFd> {
    let path = ttyname(fd).context("ttyname")?;
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    debug!(path = %path.display(), "opened controlling terminal");
    Ok(OwnedFd::from(file))
}
