use nix::errno::Errno;
use thiserror::Error;

/// Errors produced while setting up or running a tcp-pty session.
#[derive(Debug, Error)]
pub enum TcpPtyError {
    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid ip: {0}")]
    InvalidAddress(String),

    /// A system call failed; `op` names the call the way a diagnostic would.
    #[error("{op}")]
    Sys {
        op: &'static str,
        #[source]
        source: Errno,
    },

    /// The session program could not be started.
    #[error("exec {program}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TcpPtyError {
    /// Tag an errno with the name of the operation that produced it.
    pub fn sys(op: &'static str) -> impl FnOnce(Errno) -> Self {
        move |source| TcpPtyError::Sys { op, source }
    }
}

pub type TcpPtyResult<T> = Result<T, TcpPtyError>;
