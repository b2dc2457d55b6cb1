// ABOUTME: Parser splitting a typed connection string into user, host literal and port
// ABOUTME: IPv6 literals are recognised by colon count and only split when bracketed

use crate::error::{PortOrigin, Result, TargetError};

/// The host part of a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostLiteral {
    /// A DNS name, IPv4 address, or `Host` alias.
    Plain(String),
    /// An IPv6 address, stored without brackets when they were given.
    Ipv6(String),
}

impl HostLiteral {
    pub fn as_str(&self) -> &str {
        match self {
            HostLiteral::Plain(host) | HostLiteral::Ipv6(host) => host,
        }
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self, HostLiteral::Ipv6(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub username: Option<String>,
    pub host: HostLiteral,
    pub port: Option<u16>,
}

/// Splits `[user@]host[:port]` and `[user@][ipv6]:port`.
///
/// Two or more colons mean an IPv6 address. Without brackets such an address
/// is kept whole, since a trailing port cannot be told apart from the last group.
pub fn parse_input(entered: &str) -> Result<ParsedInput> {
    let (username, rest) = match entered.split_once('@') {
        Some((user, rest)) => (Some(user.to_string()), rest),
        None => (None, entered),
    };

    let (host, port_str) = match rest.matches(':').count() {
        0 => (HostLiteral::Plain(rest.to_string()), None),
        1 => {
            let (host, port) = rest.rsplit_once(':').unwrap_or((rest, ""));
            (HostLiteral::Plain(host.to_string()), Some(port))
        }
        _ => split_ipv6(rest),
    };

    let port = port_str
        .map(|p| parse_port(p, PortOrigin::Input))
        .transpose()?;

    Ok(ParsedInput {
        username,
        host,
        port,
    })
}

fn split_ipv6(token: &str) -> (HostLiteral, Option<&str>) {
    let bracketed = token
        .strip_prefix('[')
        .and_then(|inner| inner.rfind(']').map(|end| (&inner[..end], &inner[end..])));

    match bracketed {
        Some((address, after)) => {
            let port = after.rsplit_once(':').map(|(_, port)| port);
            (HostLiteral::Ipv6(address.to_string()), port)
        }
        None => (HostLiteral::Ipv6(token.to_string()), None),
    }
}

/// Parses a decimal port number in `1..=65535`.
pub fn parse_port(port: &str, origin: PortOrigin) -> Result<u16> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TargetError::NonDigitPort { origin });
    }
    // Only overflow can fail here, which is out of range as well.
    match port.parse::<u16>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(TargetError::InvalidPort { origin }),
    }
}
