//! The concrete type-resolution service.
//!
//! `Importer` resolves a package from the standard metadata root or from
//! source. Source packages are parsed and checked: every import must name a
//! package that resolves in turn. Dependencies that fail to resolve from
//! source may fall back to precompiled metadata; those packages are
//! remembered so the caller can report them.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info};

use super::locator::{PackageLocation, PackageLocator, SourceFile};
use super::scope::Scope;
use super::source::{build_scope, collect_imports, parse_source, Import};
use super::TypeResolver;
use crate::errors::{ResolveError, ResolveResult};

/// Crates shipped with the toolchain; importing them never fails, even when
/// no metadata describes them.
const TOOLCHAIN_CRATES: [&str; 5] = ["std", "core", "alloc", "proc_macro", "test"];

pub struct Importer {
    locator: PackageLocator,
    use_fallback: bool,
    /// Scopes resolved from source or the standard root, by package path.
    scopes: HashMap<String, Rc<Scope>>,
    /// Scopes of dependencies loaded from fallback metadata.
    fallback_scopes: HashMap<String, Rc<Scope>>,
    /// Packages currently being checked, to detect import cycles.
    in_progress: HashSet<String>,
    fallbacks: Vec<String>,
}

impl Importer {
    pub fn new(locator: PackageLocator) -> Self {
        Self {
            locator,
            use_fallback: true,
            scopes: HashMap::new(),
            fallback_scopes: HashMap::new(),
            in_progress: HashSet::new(),
            fallbacks: Vec::new(),
        }
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.use_fallback = enabled;
        self
    }

    /// Resolves a dependency, falling back to precompiled metadata when the
    /// source route fails.
    fn import(&mut self, path: &str) -> ResolveResult<Rc<Scope>> {
        if let Some(scope) = self.scopes.get(path).or_else(|| self.fallback_scopes.get(path)) {
            return Ok(Rc::clone(scope));
        }
        if self.in_progress.contains(path) {
            return Err(ResolveError::check(path, "import cycle"));
        }

        let err = match self.resolve(path) {
            Ok(scope) => return Ok(scope),
            Err(err) => err,
        };

        let metadata = if self.use_fallback {
            self.locator.fallback_metadata(path)
        } else {
            None
        };
        let Some(metadata) = metadata else {
            return Err(err);
        };

        info!(package = path, reason = %err, "falling back to precompiled metadata");
        let scope = Rc::new(load_metadata(path, &metadata)?);
        self.fallback_scopes.insert(path.to_string(), Rc::clone(&scope));
        if !self.fallbacks.iter().any(|p| p == path) {
            self.fallbacks.push(path.to_string());
        }
        Ok(scope)
    }

    /// Finds the package behind an import and resolves it.
    fn resolve_import(&mut self, importer: &str, import: &Import) -> Result<(), String> {
        if import.is_local() {
            return Ok(());
        }

        for candidate in import.candidates() {
            if candidate == importer {
                return Ok(());
            }
            if self.scopes.contains_key(&candidate) || self.locator.knows(&candidate) {
                return self
                    .import(&candidate)
                    .map(|_| ())
                    .map_err(|e| format!("could not import `{}` ({})", import, e));
            }
        }

        match import.root() {
            Some(root) if TOOLCHAIN_CRATES.contains(&root) => Ok(()),
            _ => Err(format!("could not import `{}`: no package found", import)),
        }
    }

    /// Parses every file, then checks the imports of the whole package.
    fn check_source(&mut self, path: &str, files: &[SourceFile]) -> ResolveResult<Scope> {
        let parsed = files
            .iter()
            .map(|file| parse_source(path, file))
            .collect::<ResolveResult<Vec<_>>>()?;

        self.in_progress.insert(path.to_string());
        let checked = parsed.iter().try_for_each(|file| {
            collect_imports(file)
                .iter()
                .try_for_each(|import| self.resolve_import(path, import))
        });
        self.in_progress.remove(path);
        checked.map_err(|message| ResolveError::check(path, message))?;

        Ok(build_scope(path, &parsed))
    }
}

impl TypeResolver for Importer {
    fn resolve(&mut self, path: &str) -> ResolveResult<Rc<Scope>> {
        if let Some(scope) = self.scopes.get(path) {
            return Ok(Rc::clone(scope));
        }

        let scope = match self.locator.locate(path)? {
            PackageLocation::Std { metadata } => load_metadata(path, &metadata)?,
            PackageLocation::Source { files, .. } => self.check_source(path, &files)?,
        };
        debug!(package = path, objects = scope.len(), "resolved package");

        let scope = Rc::new(scope);
        self.scopes.insert(path.to_string(), Rc::clone(&scope));
        Ok(scope)
    }

    fn fallbacks(&self) -> &[String] {
        &self.fallbacks
    }
}

/// Reads a precompiled scope; the requested path wins over the recorded one.
pub fn load_metadata(path: &str, file: &Path) -> ResolveResult<Scope> {
    let metadata_error = |message: String| ResolveError::Metadata {
        path: path.to_string(),
        file: file.to_path_buf(),
        message,
    };

    let json = fs::read_to_string(file).map_err(|e| metadata_error(e.to_string()))?;
    let mut scope = Scope::from_json(&json).map_err(|e| metadata_error(e.to_string()))?;
    if scope.path != path {
        if !scope.path.is_empty() {
            debug!(package = path, recorded = %scope.path, "metadata records a different package path");
        }
        scope.path = path.to_string();
    }
    Ok(scope)
}
