//! Mapping package paths to directories and metadata files.
//!
//! A package path is a `/`-separated path relative to one of the roots:
//! `<source_root>/<path>/` holds a source package (its `.rs` files),
//! `<std_root>/<path>.json` and `<metadata_root>/<path>.json` hold
//! precompiled scopes.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use super::gating::is_gated;
use crate::config::SigfindConfig;
use crate::errors::{ResolveError, ResolveResult};

/// A source file that is eligible for parsing, with its contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub enum PackageLocation {
    /// Package of the standard root: its scope comes from metadata only.
    Std { metadata: PathBuf },
    /// Package parsed from source.
    Source { dir: PathBuf, files: Vec<SourceFile> },
}

#[derive(Debug, Clone, Default)]
pub struct PackageLocator {
    source_roots: Vec<PathBuf>,
    std_root: Option<PathBuf>,
    metadata_root: Option<PathBuf>,
}

impl PackageLocator {
    pub fn new(source_roots: Vec<PathBuf>) -> Self {
        Self {
            source_roots,
            std_root: None,
            metadata_root: None,
        }
    }

    pub fn with_std_root(mut self, root: Option<PathBuf>) -> Self {
        self.std_root = root;
        self
    }

    pub fn with_metadata_root(mut self, root: Option<PathBuf>) -> Self {
        self.metadata_root = root;
        self
    }

    pub fn from_config(config: &SigfindConfig) -> Self {
        Self::new(config.source_roots.clone())
            .with_std_root(config.std_root.clone())
            .with_metadata_root(config.metadata_root.clone())
    }

    /// Metadata file for a package of the standard root.
    pub fn std_metadata(&self, path: &str) -> Option<PathBuf> {
        metadata_file(self.std_root.as_deref()?, path)
    }

    /// Metadata file usable when a dependency cannot be resolved from source.
    pub fn fallback_metadata(&self, path: &str) -> Option<PathBuf> {
        metadata_file(self.metadata_root.as_deref()?, path)
    }

    /// Directory of a source package in the first root that has it.
    pub fn source_dir(&self, path: &str) -> Option<PathBuf> {
        let relative = relative_path(path)?;
        self.source_roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|dir| dir.is_dir())
    }

    /// Whether the path names a package in any of the roots.
    pub fn knows(&self, path: &str) -> bool {
        self.std_metadata(path).is_some()
            || self.source_dir(path).is_some()
            || self.fallback_metadata(path).is_some()
    }

    /// Finds a package and, for source packages, reads its eligible files.
    pub fn locate(&self, path: &str) -> ResolveResult<PackageLocation> {
        if relative_path(path).is_none() {
            return Err(ResolveError::import(path, "invalid package path"));
        }

        if let Some(metadata) = self.std_metadata(path) {
            debug!(package = path, file = %metadata.display(), "located in standard root");
            return Ok(PackageLocation::Std { metadata });
        }

        let Some(dir) = self.source_dir(path) else {
            return Err(ResolveError::import(
                path,
                format!("cannot find package `{}` in any source root", path),
            ));
        };

        let files = read_source_files(path, &dir)?;
        if files.is_empty() {
            return Err(ResolveError::NoSourceFiles {
                path: path.to_string(),
            });
        }
        debug!(package = path, dir = %dir.display(), files = files.len(), "located source package");
        Ok(PackageLocation::Source { dir, files })
    }

    /// Every directory below a source root that contains a `.rs` file.
    pub fn source_packages(&self) -> Vec<String> {
        let mut packages = BTreeSet::new();
        for root in &self.source_roots {
            let walker = WalkDir::new(root)
                .min_depth(1)
                .into_iter()
                .filter_entry(|entry| !is_skipped_dir(entry.path(), entry.depth()));
            for entry in walker.filter_map(Result::ok) {
                let file = entry.path();
                if !entry.file_type().is_file() || !has_extension(file, "rs") {
                    continue;
                }
                if let Some(package) = file.parent().and_then(|dir| package_path(root, dir)) {
                    packages.insert(package);
                }
            }
        }
        packages.into_iter().collect()
    }

    /// Every package of the standard root.
    pub fn std_packages(&self) -> Vec<String> {
        let Some(root) = &self.std_root else {
            return Vec::new();
        };
        let mut packages = BTreeSet::new();
        for entry in WalkDir::new(root).min_depth(1).into_iter().filter_map(Result::ok) {
            let file = entry.path();
            if entry.file_type().is_file() && has_extension(file, "json") {
                if let Some(package) = package_path(root, &file.with_extension("")) {
                    packages.insert(package);
                }
            }
        }
        packages.into_iter().collect()
    }

    /// Standard and source packages together, sorted and deduplicated.
    pub fn all_packages(&self) -> Vec<String> {
        let mut all: BTreeSet<String> = self.std_packages().into_iter().collect();
        all.extend(self.source_packages());
        all.into_iter().collect()
    }

    /// Package path of a filesystem directory lying inside a source root.
    pub fn package_for_dir(&self, dir: &Path) -> Option<String> {
        let dir = dir.canonicalize().ok()?;
        self.source_roots.iter().find_map(|root| {
            let root = root.canonicalize().ok()?;
            let relative = dir.strip_prefix(&root).ok()?;
            Some(join_components(relative))
        })
    }
}

/// Converts `a/b` into a relative filesystem path, rejecting anything that
/// could escape the root.
fn relative_path(path: &str) -> Option<PathBuf> {
    if path.is_empty() {
        return None;
    }
    let mut relative = PathBuf::new();
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }
        relative.push(segment);
    }
    Some(relative)
}

fn metadata_file(root: &Path, path: &str) -> Option<PathBuf> {
    let mut file = root.join(relative_path(path)?);
    let name = format!("{}.json", file.file_name()?.to_string_lossy());
    file.set_file_name(name);
    file.is_file().then_some(file)
}

fn package_path(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let package = join_components(relative);
    (!package.is_empty()).then_some(package)
}

fn join_components(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

fn is_skipped_dir(path: &Path, depth: usize) -> bool {
    if depth == 0 || !path.is_dir() {
        return false;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.starts_with('.') || name == "target"
}

/// Test files are not part of a package's public surface.
pub fn is_test_file(file_name: &str) -> bool {
    file_name == "tests.rs" || file_name.ends_with("_test.rs") || file_name.ends_with("_tests.rs")
}

fn read_source_files(package: &str, dir: &Path) -> ResolveResult<Vec<SourceFile>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ResolveError::import(package, format!("reading {}: {}", dir.display(), e)))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, "rs"))
        .collect();
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if is_test_file(&name) {
            trace!(file = %path.display(), "skipping test file");
            continue;
        }
        let contents = fs::read_to_string(&path).map_err(|e| {
            ResolveError::import(package, format!("reading {}: {}", path.display(), e))
        })?;
        if is_gated(&contents) {
            trace!(file = %path.display(), "skipping gated file");
            continue;
        }
        files.push(SourceFile { path, contents });
    }
    Ok(files)
}
