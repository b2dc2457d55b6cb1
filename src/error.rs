// ABOUTME: Error types raised while resolving a connection target
// ABOUTME: Only validation failures surface here; unreadable config files are skipped instead

use std::fmt;
use thiserror::Error;

/// Where a rejected port number came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOrigin {
    /// The connection string typed by the user.
    Input,
    /// A `Port` directive in an ssh config file.
    SshConfig,
}

impl fmt::Display for PortOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortOrigin::Input => Ok(()),
            PortOrigin::SshConfig => write!(f, " in ssh config"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("non-digit port number{origin}")]
    NonDigitPort { origin: PortOrigin },

    #[error("invalid port number{origin}")]
    InvalidPort { origin: PortOrigin },

    #[error("invalid host name")]
    InvalidHost,
}

pub type Result<T> = std::result::Result<T, TargetError>;
