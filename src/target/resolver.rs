// ABOUTME: Single resolution pass from a typed connection string to a ConnectionTarget
// ABOUTME: Parses the input, layers ssh config underneath it, validates, then lists key candidates

use crate::env::{Environment, SystemEnvironment};
use crate::error::{Result, TargetError};
use crate::target::descriptor::{ConnectionTarget, FieldSources};
use crate::target::identity::identity_files;
use crate::target::input::parse_input;
use crate::target::precedence::Resolved;
use crate::target::ssh_config::{ConfigLoader, HostSettings};
use std::path::Path;

impl ConnectionTarget {
    /// Resolves `entered` against the current user's ssh config.
    ///
    /// A non-empty `identity_override` becomes the only key candidate.
    pub fn resolve(entered: &str, identity_override: Option<&Path>) -> Result<Self> {
        Self::resolve_with(entered, identity_override, &SystemEnvironment::new())
    }

    pub fn resolve_with(
        entered: &str,
        identity_override: Option<&Path>,
        env: &dyn Environment,
    ) -> Result<Self> {
        let parsed = parse_input(entered)?;
        let is_ipv6_literal = parsed.host.is_ipv6();
        let display_host = parsed.host.as_str().to_string();

        let mut settings = HostSettings {
            host: Resolved::fallback(display_host.clone()),
            username: match parsed.username {
                Some(user) => Resolved::explicit(user),
                None => Resolved::fallback(env.local_user()),
            },
            port: match parsed.port {
                Some(port) => Resolved::explicit(port),
                None => Resolved::fallback(22),
            },
            identity_file: Resolved::fallback(None),
        };

        ConfigLoader::new(&display_host, env.home_dir())
            .load_candidates(&env.config_candidates(), &mut settings)?;

        let HostSettings {
            host,
            username,
            port,
            identity_file,
        } = settings;

        // A config HostName is validated too, since the host ends up in key file names.
        if host.value().contains(['/', '\\']) {
            return Err(TargetError::InvalidHost);
        }

        let identity_override = identity_override.filter(|p| !p.as_os_str().is_empty());
        let identity_files = identity_files(
            identity_file.value().as_deref(),
            env.key_dir().as_deref(),
            host.value(),
            identity_override,
        );

        let sources = FieldSources {
            host: host.source(),
            username: username.source(),
            port: port.source(),
            identity_file: identity_file.source(),
        };

        let target = ConnectionTarget {
            entered: entered.to_string(),
            host: host.into_value(),
            display_host,
            username: username.into_value(),
            port: port.into_value(),
            is_ipv6_literal,
            identity_files,
            sources,
        };
        tracing::debug!("Resolved {:?} to {}", entered, target);
        Ok(target)
    }
}
