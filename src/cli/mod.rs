pub mod setup;

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::config::{SigfindConfig, ENV_METADATA_ROOT, ENV_STD_ROOT};
use crate::filter::{MatchMode, TypeFilterSet};

#[derive(Parser, Debug)]
#[command(name = "sigfind")]
#[command(about = "Find functions and methods by the types they take and return", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Comma-separated list of packages to search for functions (`...` is a wildcard)
    #[arg(long = "pkgs", value_name = "PATTERNS")]
    pub packages: Vec<String>,

    /// Comma-separated list of argument types to match
    #[arg(long = "args", value_name = "TYPES")]
    pub arguments: Vec<String>,

    /// Comma-separated list of return types to match
    #[arg(long = "rets", value_name = "TYPES")]
    pub returns: Vec<String>,

    /// Use AND instead of OR for matching functions
    #[arg(long = "and")]
    pub and: bool,

    /// Configuration file (defaults to the nearest .sigfind.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source root to search for packages (repeatable)
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Directory of precompiled metadata for standard packages
    #[arg(long = "std-root", value_name = "DIR", env = ENV_STD_ROOT)]
    pub std_root: Option<PathBuf>,

    /// Directory of precompiled metadata used when a dependency fails to resolve
    #[arg(long = "metadata-root", value_name = "DIR", env = ENV_METADATA_ROOT)]
    pub metadata_root: Option<PathBuf>,

    /// Never fall back to precompiled metadata for dependencies
    #[arg(long = "no-fallback")]
    pub no_fallback: bool,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

/// Invocations that cannot start a search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Need to specify at least one package to check.")]
    MissingPackages,
    #[error("Need at least one type to search for.")]
    MissingTypes,
}

/// Splits a comma-separated list, ignoring commas nested in `<>`, `()` and
/// `[]` so that types like `HashMap<String, u8>` stay whole. Entries are
/// trimmed and empty entries dropped.
pub fn split_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth: usize = 0;
    let mut current = String::new();
    let mut prev = None;

    for c in value.chars() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' if prev == Some('-') => {}
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(std::mem::take(&mut current));
                prev = Some(c);
                continue;
            }
            _ => {}
        }
        current.push(c);
        prev = Some(c);
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn split_all(values: &[String]) -> Vec<String> {
    values.iter().flat_map(|value| split_list(value)).collect()
}

impl Cli {
    pub fn package_patterns(&self) -> Vec<String> {
        split_all(&self.packages)
    }

    pub fn filter(&self) -> TypeFilterSet {
        TypeFilterSet::new(
            split_all(&self.arguments),
            split_all(&self.returns),
            MatchMode::from_and_flag(self.and),
        )
    }

    pub fn validate(&self) -> Result<(), UsageError> {
        if self.package_patterns().is_empty() {
            return Err(UsageError::MissingPackages);
        }
        if self.filter().is_empty() {
            return Err(UsageError::MissingTypes);
        }
        Ok(())
    }

    /// Flags, and the root variables bound to them, take precedence over
    /// the config file and `SIGFIND_PATH`.
    pub fn apply_overrides(&self, config: &mut SigfindConfig) {
        if !self.roots.is_empty() {
            config.source_roots = self.roots.clone();
        }
        if let Some(root) = &self.std_root {
            config.std_root = Some(root.clone());
        }
        if let Some(root) = &self.metadata_root {
            config.metadata_root = Some(root.clone());
        }
        if self.no_fallback {
            config.metadata_fallback = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sigfind").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_split_list_respects_nesting() {
        assert_eq!(
            split_list("HashMap<String, u8>, &str,fn(u8, u8) -> u8,[u8; 4]"),
            vec!["HashMap<String, u8>", "&str", "fn(u8, u8) -> u8", "[u8; 4]"]
        );
    }

    #[test]
    fn test_split_list_drops_empty_entries() {
        assert!(split_list("").is_empty());
        assert_eq!(split_list("a,,b, "), vec!["a", "b"]);
    }

    #[test]
    fn test_split_list_arrow_does_not_close_generics() {
        assert_eq!(
            split_list("Box<dyn Fn(u8) -> bool>,u8"),
            vec!["Box<dyn Fn(u8) -> bool>", "u8"]
        );
    }

    #[test]
    fn test_filter_from_flags() {
        let cli = parse(&["--pkgs=text", "--args=&str", "--rets", "String,usize", "--and"]);
        let filter = cli.filter();
        assert_eq!(filter.args, vec!["&str"]);
        assert_eq!(filter.rets, vec!["String", "usize"]);
        assert_eq!(filter.mode, MatchMode::And);
        assert_eq!(cli.validate(), Ok(()));
    }

    #[test]
    fn test_repeated_flags_accumulate() {
        let cli = parse(&["--pkgs", "a,b", "--pkgs", "c/...", "--rets", "u8"]);
        assert_eq!(cli.package_patterns(), vec!["a", "b", "c/..."]);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(parse(&["--args=u8"]).validate(), Err(UsageError::MissingPackages));
        assert_eq!(parse(&["--pkgs=a"]).validate(), Err(UsageError::MissingTypes));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&["--pkgs=a", "--rets=u8", "--root", "/src", "--no-fallback"]);
        let mut config = SigfindConfig {
            source_roots: vec![PathBuf::from("/from/config")],
            ..SigfindConfig::default()
        };
        cli.apply_overrides(&mut config);
        assert_eq!(config.source_roots, vec![PathBuf::from("/src")]);
        assert!(!config.metadata_fallback);
    }
}
