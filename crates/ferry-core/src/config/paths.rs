//! Config path resolution helpers.

use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "ferry.toml";

/// Pick the config file to load.
///
/// An explicit path always wins. Otherwise the working directory is checked
/// before the global config directory; the global path is returned even when
/// it does not exist so callers fall back to defaults.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    working_dir: &Path,
    global_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = working_dir.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    global_dir.map(|dir| dir.join("ferry").join(CONFIG_FILE_NAME))
}
