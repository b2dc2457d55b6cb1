// ABOUTME: Loader for the OpenSSH client config subset used to resolve a single target
// ABOUTME: Host blocks, recursive Include, first-match-wins HostName/User/Port/IdentityFile

use crate::env::expand_tilde;
use crate::error::{PortOrigin, Result, TargetError};
use crate::target::input::parse_port;
use crate::target::precedence::{Resolved, Source};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The fields an ssh config file may fill in for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    pub host: Resolved<String>,
    pub username: Resolved<String>,
    pub port: Resolved<u16>,
    pub identity_file: Resolved<Option<String>>,
}

/// Reads ssh config files on behalf of one target.
///
/// Directives only apply inside a `Host` block whose pattern is the target's
/// display host, `*`, or before any `Host` line at all. `Include` is expanded
/// in place, so included directives rank exactly where the `Include` line
/// sits. Each file is read at most once per loader, which breaks include cycles.
#[derive(Debug)]
pub struct ConfigLoader<'a> {
    display_host: String,
    home: Option<&'a Path>,
    visited: HashSet<PathBuf>,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(display_host: &str, home: Option<&'a Path>) -> Self {
        Self {
            display_host: display_host.to_lowercase(),
            home,
            visited: HashSet::new(),
        }
    }

    /// Loads each candidate in order. Missing or unreadable files are skipped;
    /// only invalid values abort.
    pub fn load_candidates(
        &mut self,
        paths: &[PathBuf],
        settings: &mut HostSettings,
    ) -> Result<()> {
        for path in paths {
            if !path.exists() {
                tracing::debug!("ssh config {} does not exist, skipping", path.display());
                continue;
            }
            self.load_file(path, settings)?;
        }
        Ok(())
    }

    pub fn load_file(&mut self, path: &Path, settings: &mut HostSettings) -> Result<()> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !self.visited.insert(key) {
            tracing::debug!("ssh config {} already read, skipping", path.display());
            return Ok(());
        }

        let content = match read_lossy(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Failed to read ssh config {}: {}", path.display(), e);
                return Ok(());
            }
        };

        tracing::debug!("Reading ssh config {}", path.display());
        self.apply_content(&content, path, settings)
    }

    /// Applies config text as if read from `origin`, which anchors relative includes.
    pub fn apply_content(
        &mut self,
        content: &str,
        origin: &Path,
        settings: &mut HostSettings,
    ) -> Result<()> {
        let mut block = String::new();

        for line in content.lines() {
            let Some((keyword, arg)) = split_directive(line) else {
                continue;
            };

            match keyword.as_str() {
                "include" => match self.include_path(arg, origin) {
                    Some(target) if target.exists() => self.load_file(&target, settings)?,
                    Some(target) => {
                        tracing::debug!("Included ssh config {} not found", target.display());
                    }
                    None => {
                        tracing::debug!("Cannot expand Include {} without a home directory", arg);
                    }
                },
                "host" if arg.is_empty() => {
                    tracing::debug!("Ignoring Host line without a pattern in {}", origin.display());
                }
                "host" => block = arg.to_lowercase(),
                _ if self.block_matches(&block) => {
                    self.apply_directive(&keyword, arg, settings)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn block_matches(&self, block: &str) -> bool {
        block.is_empty() || block == "*" || block == self.display_host
    }

    fn apply_directive(
        &self,
        keyword: &str,
        arg: &str,
        settings: &mut HostSettings,
    ) -> Result<()> {
        let taken = match keyword {
            "port" => settings
                .port
                .offer(Source::Config, || parse_port(arg, PortOrigin::SshConfig))?,
            // The remaining directives are meaningless without an argument.
            _ if arg.is_empty() => false,
            "hostname" => settings
                .host
                .offer(Source::Config, || Ok::<_, TargetError>(arg.to_string()))?,
            "user" => settings
                .username
                .offer(Source::Config, || Ok::<_, TargetError>(arg.to_string()))?,
            // Only the first matching IdentityFile is kept.
            "identityfile" => match self.expand(arg) {
                Some(path) => settings
                    .identity_file
                    .offer(Source::Config, || Ok::<_, TargetError>(Some(path)))?,
                None => {
                    tracing::debug!("Cannot expand IdentityFile {} without a home directory", arg);
                    false
                }
            },
            _ => false,
        };

        if taken {
            tracing::debug!("Applied {} {} for {}", keyword, arg, self.display_host);
        }
        Ok(())
    }

    /// Expands a leading `~`. `None` if that needs a home directory we do not have.
    fn expand(&self, arg: &str) -> Option<String> {
        match self.home {
            Some(home) => Some(expand_tilde(arg, home)),
            None if arg.starts_with('~') => None,
            None => Some(arg.to_string()),
        }
    }

    fn include_path(&self, arg: &str, origin: &Path) -> Option<PathBuf> {
        let path = PathBuf::from(self.expand(arg)?);
        if path.is_absolute() {
            return Some(path);
        }
        Some(match origin.parent() {
            Some(dir) => dir.join(path),
            None => path,
        })
    }
}

fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Splits a line into a lower-cased keyword and its first argument.
///
/// A double-quoted argument may contain spaces; the quotes are removed.
fn split_directive(line: &str) -> Option<(String, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (keyword, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    let rest = rest.trim_start();

    let arg = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split_once('"').map_or(quoted, |(inner, _)| inner),
        None => rest.split_whitespace().next().unwrap_or(""),
    };

    Some((keyword.to_ascii_lowercase(), arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(host: &str) -> HostSettings {
        HostSettings {
            host: Resolved::fallback(host.to_string()),
            username: Resolved::fallback("local".to_string()),
            port: Resolved::fallback(22),
            identity_file: Resolved::fallback(None),
        }
    }

    fn apply(display_host: &str, content: &str) -> Result<HostSettings> {
        let home = Path::new("/home/alice");
        let mut settings = settings(display_host);
        ConfigLoader::new(display_host, Some(home)).apply_content(
            content,
            Path::new("/home/alice/.ssh/config"),
            &mut settings,
        )?;
        Ok(settings)
    }

    #[test]
    fn test_split_directive() {
        assert_eq!(
            split_directive("  HostName  example.com  "),
            Some(("hostname".to_string(), "example.com"))
        );
        assert_eq!(split_directive("USER bob extra"), Some(("user".to_string(), "bob")));
        assert_eq!(
            split_directive("IdentityFile \"~/My Keys/id_rsa\""),
            Some(("identityfile".to_string(), "~/My Keys/id_rsa"))
        );
        assert_eq!(split_directive("Port"), Some(("port".to_string(), "")));
        assert_eq!(split_directive("# comment"), None);
        assert_eq!(split_directive("   "), None);
    }

    #[test]
    fn test_matching_block_applies() {
        let content = "Host foo
    HostName bar.example.com
    User admin
    Port 2200
    IdentityFile ~/.ssh/foo_key

Host other
    HostName other.example.com
    User nobody
";

        let settings = apply("foo", content).unwrap();

        assert_eq!(settings.host.value(), "bar.example.com");
        assert_eq!(settings.username.value(), "admin");
        assert_eq!(*settings.port.value(), 2200);
        assert_eq!(
            settings.identity_file.value().as_deref(),
            Some("/home/alice/.ssh/foo_key")
        );
    }

    #[test]
    fn test_host_pattern_is_case_insensitive() {
        let settings = apply("Foo", "host \"FOO\"\n  hostname bar\n").unwrap();
        assert_eq!(settings.host.value(), "bar");
    }

    #[test]
    fn test_non_matching_block_ignored() {
        let content = "Host foobar\n  HostName nope\nHost *.example.com\n  User nope\n";
        let settings = apply("foo", content).unwrap();

        assert_eq!(settings.host.value(), "foo");
        assert_eq!(settings.host.source(), Source::Default);
        assert_eq!(settings.username.value(), "local");
    }

    #[test]
    fn test_first_match_wins() {
        let content = "User top
Host *
    User wildcard
    Port 2022
Host foo
    User specific
    Port 3022
";

        let settings = apply("foo", content).unwrap();

        assert_eq!(settings.username.value(), "top");
        assert_eq!(*settings.port.value(), 2022);
    }

    #[test]
    fn test_explicit_values_not_overridden() {
        let mut settings = settings("foo");
        settings.username = Resolved::explicit("typed".to_string());
        settings.port = Resolved::explicit(2222);

        ConfigLoader::new("foo", Some(Path::new("/home/alice")))
            .apply_content(
                "Host foo\n  User config\n  Port 22\nHost *\n  User wild\n",
                Path::new("/home/alice/.ssh/config"),
                &mut settings,
            )
            .unwrap();

        assert_eq!(settings.username.value(), "typed");
        assert_eq!(*settings.port.value(), 2222);
    }

    #[test]
    fn test_only_first_identity_file_is_kept() {
        let content = "Host foo
    IdentityFile ~/.ssh/first
    IdentityFile ~/.ssh/second
Host *
    IdentityFile ~/.ssh/third
";

        let settings = apply("foo", content).unwrap();

        assert_eq!(
            settings.identity_file.value().as_deref(),
            Some("/home/alice/.ssh/first")
        );
    }

    #[test]
    fn test_bad_port_in_matching_block_fails() {
        assert_eq!(
            apply("foo", "Host foo\n  Port twenty\n").unwrap_err(),
            TargetError::NonDigitPort { origin: PortOrigin::SshConfig }
        );
        assert_eq!(
            apply("foo", "Host foo\n  Port 70000\n").unwrap_err(),
            TargetError::InvalidPort { origin: PortOrigin::SshConfig }
        );
        assert_eq!(
            apply("foo", "Port\n").unwrap_err(),
            TargetError::NonDigitPort { origin: PortOrigin::SshConfig }
        );
    }

    #[test]
    fn test_bad_port_ignored_when_not_applied() {
        // Non-matching block, and a port already set by an earlier line.
        let content = "Host bar\n  Port nope\nHost foo\n  Port 2022\nHost *\n  Port nope\n";
        let settings = apply("foo", content).unwrap();
        assert_eq!(*settings.port.value(), 2022);
    }

    #[test]
    fn test_include_takes_effect_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let ssh_dir = temp_dir.path().join(".ssh");
        fs::create_dir_all(ssh_dir.join("conf.d")).unwrap();

        fs::write(
            ssh_dir.join("config"),
            "Host foo\n  User before\nInclude conf.d/extra\n\
             Host foo\n  Port 4000\n  HostName after.example.com\n",
        )
        .unwrap();
        fs::write(
            ssh_dir.join("conf.d").join("extra"),
            "Host foo\n  User included\n  Port 3000\n",
        )
        .unwrap();

        let mut settings = settings("foo");
        ConfigLoader::new("foo", Some(temp_dir.path()))
            .load_candidates(&[ssh_dir.join("config")], &mut settings)
            .unwrap();

        // Earlier line in the including file beats the include.
        assert_eq!(settings.username.value(), "before");
        // The include beats later lines in the including file.
        assert_eq!(*settings.port.value(), 3000);
        // Later lines still fill fields nobody set.
        assert_eq!(settings.host.value(), "after.example.com");
    }

    #[test]
    fn test_include_with_tilde_and_quotes() {
        let temp_dir = TempDir::new().unwrap();
        let ssh_dir = temp_dir.path().join(".ssh");
        fs::create_dir_all(&ssh_dir).unwrap();

        fs::write(ssh_dir.join("config"), "Include \"~/.ssh/work config\"\n").unwrap();
        fs::write(ssh_dir.join("work config"), "Host foo\n  HostName work.example.com\n").unwrap();

        let mut settings = settings("foo");
        ConfigLoader::new("foo", Some(temp_dir.path()))
            .load_file(&ssh_dir.join("config"), &mut settings)
            .unwrap();

        assert_eq!(settings.host.value(), "work.example.com");
    }

    #[test]
    fn test_include_cycle_terminates() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");

        fs::write(&a, "Include b\nHost foo\n  User from_a\n").unwrap();
        fs::write(&b, "Include a\nInclude b\nHost foo\n  Port 2022\n").unwrap();

        let mut settings = settings("foo");
        ConfigLoader::new("foo", Some(temp_dir.path()))
            .load_file(&a, &mut settings)
            .unwrap();

        assert_eq!(*settings.port.value(), 2022);
        assert_eq!(settings.username.value(), "from_a");
    }

    #[test]
    fn test_missing_include_and_candidates_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("config");
        fs::write(&config, "Include does-not-exist\nHost foo\n  User ok\n").unwrap();

        let mut settings = settings("foo");
        ConfigLoader::new("foo", Some(temp_dir.path()))
            .load_candidates(&[temp_dir.path().join("missing"), config], &mut settings)
            .unwrap();

        assert_eq!(settings.username.value(), "ok");
    }

    #[test]
    fn test_bad_port_in_included_file_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("config");
        fs::write(&config, "Include inc\n").unwrap();
        fs::write(temp_dir.path().join("inc"), "Port 0\n").unwrap();

        let mut settings = settings("foo");
        let result =
            ConfigLoader::new("foo", Some(temp_dir.path())).load_file(&config, &mut settings);

        assert_eq!(
            result,
            Err(TargetError::InvalidPort { origin: PortOrigin::SshConfig })
        );
    }

    #[test]
    fn test_unreadable_candidate_and_include_skipped() {
        let temp_dir = TempDir::new().unwrap();
        // Directories exist but cannot be read as files.
        let unreadable = temp_dir.path().join("candidate.d");
        fs::create_dir_all(&unreadable).unwrap();
        fs::create_dir_all(temp_dir.path().join("include.d")).unwrap();

        let config = temp_dir.path().join("config");
        fs::write(&config, "Include include.d\nHost foo\n  User after_include\n").unwrap();
        let later = temp_dir.path().join("later");
        fs::write(&later, "Host foo\n  Port 2022\n").unwrap();

        let mut settings = settings("foo");
        ConfigLoader::new("foo", Some(temp_dir.path()))
            .load_candidates(&[unreadable.clone(), config, later], &mut settings)
            .unwrap();

        assert_eq!(settings.username.value(), "after_include");
        assert_eq!(*settings.port.value(), 2022);
    }

    #[test]
    fn test_tilde_paths_skipped_without_home() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("config");
        fs::write(
            &config,
            "Include ~/.ssh/other\nHost foo\n\
             \x20 IdentityFile ~/.ssh/id_foo\n  IdentityFile keys/id_foo\n",
        )
        .unwrap();

        let mut settings = settings("foo");
        ConfigLoader::new("foo", None)
            .load_file(&config, &mut settings)
            .unwrap();

        // The unexpandable line does not use up the single IdentityFile slot.
        assert_eq!(settings.identity_file.value().as_deref(), Some("keys/id_foo"));
    }
}
