use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::SigfindConfig;

pub const CONFIG_FILE_NAME: &str = ".sigfind.toml";

/// How far up from the current directory a config file is looked for.
const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parses a config file's contents.
pub fn parse_config(contents: &str) -> Result<SigfindConfig, String> {
    toml::from_str::<SigfindConfig>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
}

/// `start` and its parents, nearest first, at most `max_depth` of them.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

fn config_base(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Loads a discovered config file; unreadable or invalid files are skipped
/// with a warning.
fn try_load_config_from_path(config_path: &Path) -> Option<SigfindConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to read config file {}: {}", config_path.display(), e);
            }
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            debug!("Loaded config from {}", config_path.display());
            Some(config.relative_to(&config_base(config_path)))
        }
        Err(e) => {
            warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// Discovers `.sigfind.toml` in `start` or one of its ancestors.
pub fn discover_config(start: PathBuf) -> SigfindConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SigfindConfig::default()
        })
}

/// Loads the explicit config file, which must exist and parse, or else
/// discovers one from the current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<SigfindConfig> {
    if let Some(path) = explicit {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = parse_config(&contents).map_err(anyhow::Error::msg)?;
        debug!("Loaded config from {}", path.display());
        return Ok(config.relative_to(&config_base(path)));
    }

    match std::env::current_dir() {
        Ok(current) => Ok(discover_config(current)),
        Err(e) => {
            warn!("Failed to get current directory: {}. Using default config.", e);
            Ok(SigfindConfig::default())
        }
    }
}
