//! Expanding package patterns into package paths.
//!
//! `...` matches any string, `a/...` also matches `a` itself, `all` names
//! every known package and `std` every package of the standard root.
//! A wildcard that matches nothing expands to nothing, without complaint.

use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use super::locator::PackageLocator;

const WILDCARD: &str = "...";

/// Accepts `::` as a separator and drops trailing slashes.
fn normalize(pattern: &str) -> String {
    pattern.trim().replace("::", "/").trim_end_matches('/').to_string()
}

fn is_local(pattern: &str) -> bool {
    pattern == "."
        || pattern == ".."
        || pattern.starts_with("./")
        || pattern.starts_with("../")
        || Path::new(pattern).is_absolute()
}

/// Compiles a wildcard pattern into an anchored regex.
pub fn match_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = regex::escape(pattern).replace(r"\.\.\.", ".*");
    if let Some(prefix) = re.strip_suffix("/.*") {
        re = format!("{}(/.*)?", prefix);
    }
    Regex::new(&format!("^{}$", re))
}

/// Maps a local directory pattern onto the package namespace.
///
/// A source root itself is not a package; it only localizes under `...`.
fn localize(pattern: &str, locator: &PackageLocator) -> Option<String> {
    let (dir, wildcard) = match pattern.find(WILDCARD) {
        Some(index) => (pattern[..index].trim_end_matches('/'), true),
        None => (pattern, false),
    };
    let dir = if dir.is_empty() { "." } else { dir };
    let package = locator.package_for_dir(Path::new(dir))?;

    match (package.is_empty(), wildcard) {
        (true, true) => Some(WILDCARD.to_string()),
        (true, false) => None,
        (false, true) => Some(format!("{}/{}", package, WILDCARD)),
        (false, false) => Some(package),
    }
}

pub struct PatternExpander<'a> {
    locator: &'a PackageLocator,
    known: Option<Vec<String>>,
}

impl<'a> PatternExpander<'a> {
    pub fn new(locator: &'a PackageLocator) -> Self {
        Self {
            locator,
            known: None,
        }
    }

    fn known(&mut self) -> &[String] {
        let locator = self.locator;
        self.known.get_or_insert_with(|| locator.all_packages())
    }

    /// Expands one pattern; plain package paths are passed through as-is.
    pub fn expand(&mut self, pattern: &str) -> Vec<String> {
        let mut pattern = normalize(pattern);
        if pattern.is_empty() {
            return Vec::new();
        }

        if is_local(&pattern) {
            match localize(&pattern, self.locator) {
                Some(package) => pattern = package,
                None => {
                    debug!(pattern = %pattern, "local pattern does not name a package in any source root");
                    return if pattern.contains(WILDCARD) {
                        Vec::new()
                    } else {
                        vec![pattern]
                    };
                }
            }
        }

        match pattern.as_str() {
            "all" => return self.known().to_vec(),
            "std" => return self.locator.std_packages(),
            _ => {}
        }

        if !pattern.contains(WILDCARD) {
            return vec![pattern];
        }

        let re = match match_pattern(&pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "ignoring malformed pattern");
                return Vec::new();
            }
        };
        let matched: Vec<String> = self
            .known()
            .iter()
            .filter(|package| re.is_match(package))
            .cloned()
            .collect();
        debug!(pattern = %pattern, matched = matched.len(), "expanded wildcard pattern");
        matched
    }
}

/// Expands every pattern, keeping the first occurrence of each package.
pub fn expand_patterns(patterns: &[String], locator: &PackageLocator) -> Vec<String> {
    let mut expander = PatternExpander::new(locator);
    let mut packages: Vec<String> = Vec::new();
    for pattern in patterns {
        for package in expander.expand(pattern) {
            if !packages.contains(&package) {
                packages.push(package);
            }
        }
    }
    packages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, PackageLocator) {
        let root = TempDir::new().unwrap();
        for dir in ["net", "net/http", "net/mail", "network", "text/template"] {
            let path = root.path().join(dir);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join("lib.rs"), "").unwrap();
        }
        let locator = PackageLocator::new(vec![root.path().to_path_buf()]);
        (root, locator)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_match_pattern_trailing_wildcard_includes_prefix() {
        let re = match_pattern("net/...").unwrap();
        assert!(re.is_match("net"));
        assert!(re.is_match("net/http"));
        assert!(!re.is_match("network"));
    }

    #[test]
    fn test_match_pattern_inner_wildcard() {
        let re = match_pattern("net...").unwrap();
        assert!(re.is_match("network"));
        assert!(re.is_match("net/http"));
        assert!(!re.is_match("text/template"));
    }

    #[test]
    fn test_expand_wildcards_and_dedup() {
        let (_root, locator) = fixture();
        let packages = expand_patterns(&strings(&["net/http", "net/...", "text::template"]), &locator);
        assert_eq!(
            packages,
            strings(&["net/http", "net", "net/mail", "text/template"])
        );
    }

    #[test]
    fn test_expand_all() {
        let (_root, locator) = fixture();
        assert_eq!(
            expand_patterns(&strings(&["all"]), &locator),
            strings(&["net", "net/http", "net/mail", "network", "text/template"])
        );
    }

    #[test]
    fn test_unmatched_wildcard_is_silently_empty() {
        let (_root, locator) = fixture();
        assert!(expand_patterns(&strings(&["nothing/..."]), &locator).is_empty());
    }

    #[test]
    fn test_plain_missing_package_passes_through() {
        let (_root, locator) = fixture();
        assert_eq!(
            expand_patterns(&strings(&["does/not/exist"]), &locator),
            strings(&["does/not/exist"])
        );
    }

    #[test]
    fn test_source_root_itself_is_not_a_package() {
        let (root, locator) = fixture();
        let pattern = root.path().display().to_string();
        let packages = expand_patterns(&[pattern.clone()], &locator);

        assert_eq!(packages, vec![normalize(&pattern)]);
        assert!(locator.locate(&packages[0]).is_err());
    }

    #[test]
    fn test_source_root_with_wildcard_names_every_package() {
        let (root, locator) = fixture();
        let pattern = format!("{}/...", root.path().display());
        assert_eq!(
            expand_patterns(&[pattern], &locator),
            strings(&["net", "net/http", "net/mail", "network", "text/template"])
        );
    }

    #[test]
    fn test_absolute_directory_pattern() {
        let (root, locator) = fixture();
        let pattern = format!("{}/...", root.path().join("net").display());
        assert_eq!(
            expand_patterns(&[pattern], &locator),
            strings(&["net", "net/http", "net/mail"])
        );
    }
}
