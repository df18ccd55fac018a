// Test utility module for sigfind integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway workspace with a source root, a standard metadata root and a
/// fallback metadata root.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for root in ["src", "std", "meta"] {
            fs::create_dir_all(dir.path().join(root)).expect("Failed to create root");
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.path().join("src")
    }

    pub fn std_root(&self) -> PathBuf {
        self.path().join("std")
    }

    pub fn meta(&self) -> PathBuf {
        self.path().join("meta")
    }

    /// Writes `<src>/<package>/<file>`.
    pub fn source(&self, package: &str, file: &str, contents: &str) -> &Self {
        write_file(&self.src().join(package).join(file), contents);
        self
    }

    /// Writes `<std>/<package>.json`.
    pub fn std_package(&self, package: &str, json: &str) -> &Self {
        write_file(&self.std_root().join(format!("{}.json", package)), json);
        self
    }

    /// Writes `<meta>/<package>.json`.
    pub fn fallback_package(&self, package: &str, json: &str) -> &Self {
        write_file(&self.meta().join(format!("{}.json", package)), json);
        self
    }

    pub fn locator(&self) -> sigfind::PackageLocator {
        sigfind::PackageLocator::new(vec![self.src()])
            .with_std_root(Some(self.std_root()))
            .with_metadata_root(Some(self.meta()))
    }
}

pub fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("Failed to create dir");
    fs::write(path, contents).expect("Failed to write test file");
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
