//! The session process: a shell in its own session, with the PTY slave as
//! its controlling terminal and standard streams.

use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};

use nix::libc;
use nix::unistd::setsid;
use tcp_pty_core::{TcpPtyError, TcpPtyResult};
use tracing::{debug, info, warn};

/// Handle on the spawned shell.
///
/// The process is reaped exactly once. If the handle is dropped before that
/// happened, the process is killed and reaped on the spot, so no exit path
/// leaves a zombie or an orphaned shell behind.
#[derive(Debug)]
pub struct SessionChild {
    child: Child,
    status: Option<ExitStatus>,
}

impl SessionChild {
    /// Start `program` (looked up through `PATH`) on the PTY slave.
    ///
    /// The child's stdin, stdout and stderr are the slave; before exec it
    /// leaves the server's session and takes the slave as its controlling
    /// terminal. Every descriptor this process holds on the slave is closed
    /// once the child is running.
    ///
    /// A program that cannot be started, including a failure of the session
    /// setup in the child, is reported as [`TcpPtyError::Exec`].
    pub fn spawn(program: &str, slave: OwnedFd) -> TcpPtyResult<Self> {
        let stdin = slave.try_clone()?;
        let stdout = slave.try_clone()?;

        let mut cmd = Command::new(program);
        cmd.stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(slave));

        // SAFETY: the hook runs between fork and exec and only calls
        // async-signal-safe functions (setsid, ioctl).
        unsafe {
            cmd.pre_exec(|| {
                setsid()?;
                if libc::ioctl(libc::STDIN_FILENO, libc::TIOCSCTTY as _, 0) == -1 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(|source| TcpPtyError::Exec {
            program: program.to_string(),
            source,
        })?;
        info!(pid = child.id(), program, "session process started");

        Ok(Self {
            child,
            status: None,
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// The exit status, if the process has already been reaped.
    pub fn status(&self) -> Option<ExitStatus> {
        self.status
    }

    /// Reap the process if it has exited, without blocking.
    ///
    /// A stopped process is still alive and yields `None`.
    pub fn try_reap(&mut self) -> TcpPtyResult<Option<ExitStatus>> {
        if self.status.is_none() {
            self.status = self.child.try_wait()?;
            if let Some(status) = self.status {
                debug!(pid = self.child.id(), %status, "session process reaped");
            }
        }
        Ok(self.status)
    }

    /// Kill the process with SIGKILL unless it has already exited, then wait
    /// for it.
    pub fn kill_and_reap(&mut self) -> TcpPtyResult<ExitStatus> {
        if let Some(status) = self.try_reap()? {
            return Ok(status);
        }
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "kill failed, process already gone");
        }
        let status = self.child.wait()?;
        debug!(pid = self.child.id(), %status, "session process killed and reaped");
        self.status = Some(status);
        Ok(status)
    }
}

impl Drop for SessionChild {
    fn drop(&mut self) {
        if self.status.is_none() {
            if let Err(e) = self.kill_and_reap() {
                warn!(pid = self.child.id(), error = %e, "failed to reap session process");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PtyPair;
    use std::fs::File;
    use std::io::Write;
    use std::os::unix::process::ExitStatusExt;
    use std::time::{Duration, Instant};

    fn spawn_sh() -> (SessionChild, File) {
        let pty = PtyPair::open().unwrap();
        let slave = pty.open_slave().unwrap();
        let child = SessionChild::spawn("sh", slave).unwrap();
        (child, File::from(pty.into_master()))
    }

    fn reap_within(child: &mut SessionChild, limit: Duration) -> Option<ExitStatus> {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            if let Some(status) = child.try_reap().unwrap() {
                return Some(status);
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        None
    }

    #[test]
    fn shell_exit_status_is_reaped() {
        let (mut child, mut master) = spawn_sh();
        master.write_all(b"exit 7\n").unwrap();

        let status = reap_within(&mut child, Duration::from_secs(10)).expect("shell did not exit");
        assert_eq!(status.code(), Some(7));
        assert_eq!(child.status(), Some(status));
    }

    #[test]
    fn running_shell_is_not_reaped() {
        let (mut child, _master) = spawn_sh();
        assert!(child.try_reap().unwrap().is_none());
        assert!(child.status().is_none());
    }

    #[test]
    fn kill_and_reap_terminates_running_shell() {
        let (mut child, _master) = spawn_sh();
        let status = child.kill_and_reap().unwrap();
        assert_eq!(status.signal(), Some(libc::SIGKILL));

        // Later reaps report the recorded status instead of waiting again.
        assert_eq!(child.try_reap().unwrap(), Some(status));
        assert_eq!(child.kill_and_reap().unwrap(), status);
    }

    #[test]
    fn drop_reaps_running_shell() {
        let (child, _master) = spawn_sh();
        let pid = child.id();
        drop(child);
        assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let pty = PtyPair::open().unwrap();
        let slave = pty.open_slave().unwrap();
        match SessionChild::spawn("tcp-pty-no-such-shell", slave) {
            Err(TcpPtyError::Exec { program, source }) => {
                assert_eq!(program, "tcp-pty-no-such-shell");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected exec failure, got {other:?}"),
        }
    }
}
