use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_DIR: &str = ".gomod-license";
const CONFIG_FILE: &str = "config.toml";

/// Root configuration structure, deserialized from `.gomod-license/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct CacheConfig {
    /// Module cache root; takes precedence over `GOMODCACHE` and `GOPATH`.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    /// Directory of extra `<license-id>.txt` reference texts.
    pub corpus_dir: Option<PathBuf>,
    /// Number of dependencies resolved in parallel.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            corpus_dir: None,
            jobs: default_jobs(),
        }
    }
}

fn default_jobs() -> usize {
    8
}

/// Load configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.gomod-license/config.toml`
/// 3. `~/.config/gomod-license/config.toml`
/// 4. Built-in [`Config::default`]
///
/// Relative paths inside a file are resolved against the file's directory.
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(CONFIG_DIR).join(CONFIG_FILE);
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("gomod-license").join(CONFIG_FILE);
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;

    let base = path.parent().unwrap_or(Path::new("."));
    config.cache.root = config.cache.root.map(|p| base.join(p));
    config.scan.corpus_dir = config.scan.corpus_dir.map(|p| base.join(p));

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.scan.jobs, 8);
        assert!(config.cache.root.is_none());
        assert!(config.scan.corpus_dir.is_none());
    }

    #[test]
    fn test_project_config_paths_are_relative_to_file() {
        let project = tempfile::tempdir().unwrap();
        let dir = project.path().join(CONFIG_DIR);
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(
            dir.join(CONFIG_FILE),
            "[cache]\nroot = \"/abs/modcache\"\n\n[scan]\ncorpus_dir = \"licenses\"\njobs = 2\n",
        )
        .unwrap();

        let config = load_config(project.path(), None).unwrap();
        assert_eq!(config.cache.root, Some(PathBuf::from("/abs/modcache")));
        assert_eq!(config.scan.corpus_dir, Some(dir.join("licenses")));
        assert_eq!(config.scan.jobs, 2);
    }

    #[test]
    fn test_override_must_parse() {
        let project = tempfile::tempdir().unwrap();
        let path = project.path().join("bad.toml");
        std::fs::write(&path, "[scan]\njobs = \"many\"\n").unwrap();
        assert!(load_config(project.path(), Some(&path)).is_err());
    }
}
