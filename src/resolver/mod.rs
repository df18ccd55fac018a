//! Package discovery and type resolution.
//!
//! The rest of the crate only talks to [`TypeResolver`]; [`Importer`] is the
//! implementation backed by Rust source and precompiled metadata, and tests
//! substitute in-memory resolvers.

pub mod gating;
pub mod importer;
pub mod locator;
pub mod patterns;
pub mod render;
pub mod scope;
pub mod source;

use std::rc::Rc;

use crate::errors::ResolveResult;

pub use importer::Importer;
pub use locator::{PackageLocation, PackageLocator};
pub use patterns::expand_patterns;
pub use scope::{Method, Object, Scope};

/// Turns a package path into the scope of its top-level names.
pub trait TypeResolver {
    fn resolve(&mut self, path: &str) -> ResolveResult<Rc<Scope>>;

    /// Packages whose scope had to be taken from fallback metadata, in the
    /// order the fallbacks happened.
    fn fallbacks(&self) -> &[String] {
        &[]
    }
}
