// ABOUTME: The fully resolved connection target and its textual renderings
// ABOUTME: Collapsed renderings avoid colons so they can be used in file names

use crate::target::precedence::Source;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which source supplied each field that ssh config may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldSources {
    pub host: Source,
    pub username: Source,
    pub port: Source,
    pub identity_file: Source,
}

/// A connection string resolved against the user's ssh config.
///
/// Built by [`ConnectionTarget::resolve`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTarget {
    pub(crate) entered: String,
    pub(crate) host: String,
    pub(crate) display_host: String,
    pub(crate) username: String,
    pub(crate) port: u16,
    pub(crate) is_ipv6_literal: bool,
    pub(crate) identity_files: Vec<PathBuf>,
    #[serde(skip)]
    pub(crate) sources: FieldSources,
}

impl ConnectionTarget {
    /// The connection string exactly as typed.
    pub fn entered(&self) -> &str {
        &self.entered
    }

    /// Address to connect to, possibly replaced by a `HostName` directive.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The host as typed, which is what `Host` patterns are matched against.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_ipv6_literal(&self) -> bool {
        self.is_ipv6_literal
    }

    /// Private key candidates, in the order they should be tried.
    pub fn identity_files(&self) -> &[PathBuf] {
        &self.identity_files
    }

    pub fn username_given(&self) -> bool {
        self.sources.username == Source::Explicit
    }

    pub fn port_given(&self) -> bool {
        self.sources.port == Source::Explicit
    }

    pub fn hostname_set(&self) -> bool {
        self.sources.host == Source::Config
    }

    pub fn user_set(&self) -> bool {
        self.sources.username == Source::Config
    }

    pub fn port_set(&self) -> bool {
        self.sources.port == Source::Config
    }

    pub fn identity_file_set(&self) -> bool {
        self.sources.identity_file == Source::Config
    }

    /// `user@host:port`, with the alias appended when `HostName` changed the host.
    pub fn to_full_string(&self) -> String {
        let mut s = format!("{}@{}:{}", self.username, self.bracketed_host(), self.port);
        if self.host != self.display_host {
            s.push_str(&format!(" ({})", self.display_host));
        }
        s
    }

    /// `user@host_port`, with IPv6 colons turned into dots.
    pub fn to_full_collapsed(&self) -> String {
        format!("{}@{}_{}", self.username, self.collapsed_host(), self.port)
    }

    /// `host:port`.
    pub fn to_host_string(&self) -> String {
        format!("{}:{}", self.bracketed_host(), self.port)
    }

    /// `host_port`, with IPv6 colons turned into dots.
    pub fn to_host_collapsed(&self) -> String {
        format!("{}_{}", self.collapsed_host(), self.port)
    }

    fn bracketed_host(&self) -> String {
        if self.is_ipv6_literal {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    fn collapsed_host(&self) -> String {
        if self.is_ipv6_literal {
            format!("[{}]", self.host.replace(':', "."))
        } else {
            self.host.clone()
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_full_string())
    }
}
