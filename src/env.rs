// ABOUTME: Environment provider abstracting home directory, local user and ssh config locations
// ABOUTME: Keeps target resolution platform-agnostic and testable without touching real env vars

use crate::config::Config;
use std::path::{Path, PathBuf};

/// System-wide ssh config bundled with Git for Windows.
#[cfg(windows)]
const GIT_FOR_WINDOWS_SSH_CONFIG: &str = r"C:\Program Files\Git\etc\ssh\ssh_config";

/// What target resolution needs to know about the machine it runs on.
pub trait Environment {
    /// Home directory used for `~` expansion and the default key location.
    ///
    /// `None` when it cannot be determined; nothing home-relative is read then.
    fn home_dir(&self) -> Option<&Path>;

    /// Login name used when neither the connection string nor a config file names one.
    fn local_user(&self) -> String;

    /// Ssh config files to read, highest precedence first.
    fn config_candidates(&self) -> Vec<PathBuf>;

    /// Directory holding the conventional `id_*` private keys.
    fn key_dir(&self) -> Option<PathBuf> {
        self.home_dir().map(|home| home.join(".ssh"))
    }
}

/// The real environment of the current process.
#[derive(Debug, Clone)]
pub struct SystemEnvironment {
    home: Option<PathBuf>,
    extra_config_paths: Vec<PathBuf>,
    skip_default_paths: bool,
}

impl SystemEnvironment {
    pub fn new() -> Self {
        Self::with_home(dirs::home_dir())
    }

    /// Uses `home` instead of asking the OS.
    pub fn with_home(home: Option<PathBuf>) -> Self {
        if home.is_none() {
            tracing::warn!(
                "Could not determine home directory, ~/.ssh/config and default keys are skipped"
            );
        }
        Self {
            home,
            extra_config_paths: Vec::new(),
            skip_default_paths: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new().configured(config)
    }

    fn configured(mut self, config: &Config) -> Self {
        let mut config = config.clone();
        match &self.home {
            Some(home) => config.expand_paths(home),
            None => config.ssh.extra_config_paths.retain(|path| {
                let keep = !path.starts_with('~');
                if !keep {
                    tracing::warn!("Skipping {} without a home directory", path);
                }
                keep
            }),
        }

        self.skip_default_paths = config.ssh.skip_default_paths;
        self.extra_config_paths = config
            .ssh
            .extra_config_paths
            .into_iter()
            .map(PathBuf::from)
            .collect();
        self
    }

    fn default_config_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        #[cfg(windows)]
        paths.push(PathBuf::from(GIT_FOR_WINDOWS_SSH_CONFIG));
        if let Some(home) = &self.home {
            paths.push(home.join(".ssh").join("config"));
        }
        paths
    }
}

impl Default for SystemEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SystemEnvironment {
    fn home_dir(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    fn local_user(&self) -> String {
        let user = whoami::username();
        // Windows title-cases account names; remote hosts nearly always expect lower case.
        if cfg!(windows) {
            user.to_lowercase()
        } else {
            user
        }
    }

    fn config_candidates(&self) -> Vec<PathBuf> {
        let mut paths = if self.skip_default_paths {
            Vec::new()
        } else {
            self.default_config_paths()
        };
        paths.extend(self.extra_config_paths.iter().cloned());
        paths
    }
}

/// A fully specified environment, for embedding and tests.
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    pub home: PathBuf,
    pub user: String,
    pub config_paths: Vec<PathBuf>,
}

impl FixedEnvironment {
    /// Home at `home`, reading only `<home>/.ssh/config`.
    pub fn with_home(home: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        let home = home.into();
        let config_paths = vec![home.join(".ssh").join("config")];
        Self {
            home,
            user: user.into(),
            config_paths,
        }
    }
}

impl Environment for FixedEnvironment {
    fn home_dir(&self) -> Option<&Path> {
        Some(&self.home)
    }

    fn local_user(&self) -> String {
        self.user.clone()
    }

    fn config_candidates(&self) -> Vec<PathBuf> {
        self.config_paths.clone()
    }
}

/// Replaces a leading `~` (alone or followed by a separator) with `home`.
pub fn expand_tilde(path: &str, home: &Path) -> String {
    if path == "~" {
        return home.to_string_lossy().into_owned();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => path.to_string(),
    }
}
