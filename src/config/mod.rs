//! Where packages live: source roots, the standard metadata root and the
//! fallback metadata root.
//!
//! Settings are layered: `.sigfind.toml`, then environment variables, then
//! command-line flags. With no source root configured the current directory
//! is searched.

pub mod loader;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use loader::{directory_ancestors, load_config, parse_config, CONFIG_FILE_NAME};

/// Path list of source roots, like `PATH`.
pub const ENV_SOURCE_PATH: &str = "SIGFIND_PATH";
/// Read by the `--std-root` flag.
pub const ENV_STD_ROOT: &str = "SIGFIND_STD_ROOT";
/// Read by the `--metadata-root` flag.
pub const ENV_METADATA_ROOT: &str = "SIGFIND_METADATA_ROOT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigfindConfig {
    /// Directories whose subdirectories are source packages.
    pub source_roots: Vec<PathBuf>,
    /// Precompiled metadata of the standard packages.
    pub std_root: Option<PathBuf>,
    /// Precompiled metadata used when a dependency fails to resolve from source.
    pub metadata_root: Option<PathBuf>,
    pub metadata_fallback: bool,
}

impl Default for SigfindConfig {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            std_root: None,
            metadata_root: None,
            metadata_fallback: true,
        }
    }
}

impl SigfindConfig {
    /// Resolves relative paths against `base`, the config file's directory.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let anchor = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        self.source_roots = self.source_roots.into_iter().map(anchor).collect();
        self.std_root = self.std_root.map(anchor);
        self.metadata_root = self.metadata_root.map(anchor);
        self
    }

    /// Applies `SIGFIND_PATH` read through `var`.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(paths) = var(ENV_SOURCE_PATH).filter(|v| !v.is_empty()) {
            self.source_roots = std::env::split_paths(&paths).collect();
        }
    }

    /// Falls back to `cwd` as the only source root when none is configured.
    pub fn with_default_root(mut self, cwd: PathBuf) -> Self {
        if self.source_roots.is_empty() {
            self.source_roots.push(cwd);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_enable_fallback() {
        let config = SigfindConfig::default();
        assert!(config.metadata_fallback);
        assert!(config.source_roots.is_empty());
    }

    #[test]
    fn test_relative_paths_anchor_to_config_dir() {
        let config = SigfindConfig {
            source_roots: vec![PathBuf::from("src"), PathBuf::from("/abs/src")],
            std_root: Some(PathBuf::from("meta/std")),
            ..SigfindConfig::default()
        }
        .relative_to(Path::new("/project"));

        assert_eq!(
            config.source_roots,
            vec![PathBuf::from("/project/src"), PathBuf::from("/abs/src")]
        );
        assert_eq!(config.std_root, Some(PathBuf::from("/project/meta/std")));
    }

    #[test]
    fn test_env_source_path_overrides_roots() {
        let joined = std::env::join_paths(["/one", "/two"]).unwrap();
        let env: HashMap<&str, OsString> = HashMap::from([(ENV_SOURCE_PATH, joined)]);

        let mut config = SigfindConfig {
            source_roots: vec![PathBuf::from("/file")],
            ..SigfindConfig::default()
        };
        config.apply_env(|key| env.get(key).cloned());

        assert_eq!(
            config.source_roots,
            vec![PathBuf::from("/one"), PathBuf::from("/two")]
        );
    }

    #[test]
    fn test_empty_env_source_path_is_ignored() {
        let mut config = SigfindConfig {
            source_roots: vec![PathBuf::from("/file")],
            ..SigfindConfig::default()
        };
        config.apply_env(|_| Some(OsString::new()));
        assert_eq!(config.source_roots, vec![PathBuf::from("/file")]);
    }

    #[test]
    fn test_default_root_only_when_unset() {
        let config = SigfindConfig::default().with_default_root(PathBuf::from("/cwd"));
        assert_eq!(config.source_roots, vec![PathBuf::from("/cwd")]);

        let configured = SigfindConfig {
            source_roots: vec![PathBuf::from("/src")],
            ..SigfindConfig::default()
        }
        .with_default_root(PathBuf::from("/cwd"));
        assert_eq!(configured.source_roots, vec![PathBuf::from("/src")]);
    }
}
