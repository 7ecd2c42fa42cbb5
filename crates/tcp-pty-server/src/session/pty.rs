//! PTY provisioning: allocate a master, grant and unlock its slave, and
//! resolve the slave's device path.

use std::fs::OpenOptions;
use std::os::fd::{FromRawFd, IntoRawFd, OwnedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nix::fcntl::OFlag;
use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt, PtyMaster};
use tcp_pty_core::{TcpPtyError, TcpPtyResult};
use tracing::debug;

/// A freshly allocated PTY master together with the path of its slave.
///
/// The master is closed on drop, so a failure anywhere during session setup
/// releases it without extra bookkeeping.
#[derive(Debug)]
pub struct PtyPair {
    master: PtyMaster,
    slave_path: PathBuf,
}

impl PtyPair {
    /// Open a new master and prepare its slave for opening.
    pub fn open() -> TcpPtyResult<Self> {
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY)
            .map_err(TcpPtyError::sys("posix_openpt"))?;
        grantpt(&master).map_err(TcpPtyError::sys("grantpt"))?;
        unlockpt(&master).map_err(TcpPtyError::sys("unlockpt"))?;
        let slave_path = PathBuf::from(ptsname_r(&master).map_err(TcpPtyError::sys("ptsname_r"))?);

        debug!(slave = %slave_path.display(), "PTY allocated");
        Ok(Self { master, slave_path })
    }

    pub fn slave_path(&self) -> &Path {
        &self.slave_path
    }

    /// Open the slave side read/write without making it this process's
    /// controlling terminal.
    pub fn open_slave(&self) -> TcpPtyResult<OwnedFd> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(nix::libc::O_NOCTTY)
            .open(&self.slave_path)?;
        Ok(OwnedFd::from(file))
    }

    /// Give up the pair, keeping only the master descriptor.
    pub fn into_master(self) -> OwnedFd {
        // SAFETY: `into_raw_fd` hands over sole ownership of a valid,
        // open descriptor.
        unsafe { OwnedFd::from_raw_fd(self.master.into_raw_fd()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{Read, Write};

    #[test]
    fn allocates_a_pts_device() {
        let pty = PtyPair::open().unwrap();
        assert!(pty.slave_path().starts_with("/dev/pts"), "{:?}", pty.slave_path());
    }

    #[test]
    fn pairs_are_distinct() {
        let a = PtyPair::open().unwrap();
        let b = PtyPair::open().unwrap();
        assert_ne!(a.slave_path(), b.slave_path());
    }

    #[test]
    fn slave_output_reaches_master() {
        let pty = PtyPair::open().unwrap();
        let mut slave = File::from(pty.open_slave().unwrap());
        let mut master = File::from(pty.into_master());

        slave.write_all(b"ok").unwrap();

        let mut buf = [0u8; 2];
        master.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ok");
    }
}
