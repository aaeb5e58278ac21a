//! File loading for relay configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{Config, ConfigFile};

impl Config {
    /// Loads the global config from `~/.config/relay/config.toml`, if present.
    pub(super) fn load_global() -> Result<Option<ConfigFile>> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(None);
        }
        read_layer(&path).map(Some)
    }

    /// Look for relay.toml in `start`, then walk up to the git root.
    pub(super) fn load_project(start: &Path) -> Result<Option<ConfigFile>> {
        match find_project_file(start) {
            Some(path) => read_layer(&path).map(Some),
            None => Ok(None),
        }
    }
}

fn find_project_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        // Stop at git root or filesystem root
        if dir.join(".git").exists() || !dir.pop() {
            return None;
        }
    }
}

fn read_layer(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;
    let layer: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config at {:?}", path))?;
    tracing::debug!(path = %path.display(), "loaded config layer");
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_file_found_in_parent_below_git_root() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join(".git")).unwrap();
        fs::write(
            root.path().join(crate::constants::PROJECT_CONFIG_FILENAME),
            "model = \"gpt-4o\"\n",
        )
        .unwrap();
        let nested = root.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let layer = Config::load_project(&nested).unwrap().unwrap();
        assert_eq!(layer.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn search_stops_at_git_root() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(
            outer.path().join(crate::constants::PROJECT_CONFIG_FILENAME),
            "model = \"outer\"\n",
        )
        .unwrap();
        let repo = outer.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();

        assert!(Config::load_project(&repo).unwrap().is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "modle = \"typo\"\n").unwrap();
        assert!(read_layer(&path).is_err());
    }
}
