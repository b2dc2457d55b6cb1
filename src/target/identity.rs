// ABOUTME: Builds the ordered list of private key files to try for a resolved target
// ABOUTME: Config-supplied keys come first, followed by the conventional per-host and generic names

use std::path::{Path, PathBuf};

const KEY_TYPES: [&str; 3] = ["id_rsa", "id_dsa", "id_ed25519"];

/// Conventional key names under `key_dir`: per-host variants first, then the generic ones.
pub fn fallback_identity_files(key_dir: &Path, host: &str) -> Vec<PathBuf> {
    let per_host = KEY_TYPES
        .iter()
        .map(|key| key_dir.join(format!("{key}_{host}")));
    let generic = KEY_TYPES.iter().map(|key| key_dir.join(key));
    per_host.chain(generic).collect()
}

/// An explicit override replaces every other candidate.
///
/// Without a `key_dir` only the configured key is listed.
pub fn identity_files(
    configured: Option<&str>,
    key_dir: Option<&Path>,
    host: &str,
    override_path: Option<&Path>,
) -> Vec<PathBuf> {
    if let Some(path) = override_path {
        return vec![path.to_path_buf()];
    }

    configured
        .map(PathBuf::from)
        .into_iter()
        .chain(
            key_dir
                .map(|dir| fallback_identity_files(dir, host))
                .unwrap_or_default(),
        )
        .collect()
}
