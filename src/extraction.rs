//! Flattening package scopes into declarations.

use tracing::debug;

use crate::core::Declaration;
use crate::errors::ResolveError;
use crate::resolver::{Object, Scope, TypeResolver};

/// Declarations of every package that resolved, plus the errors of those
/// that did not, both in encounter order.
#[derive(Debug, Default)]
pub struct Extraction {
    pub declarations: Vec<Declaration>,
    pub errors: Vec<ResolveError>,
}

/// Functions and methods of one scope.
///
/// Every declaration, methods included, is attributed to `package`
/// explicitly; nothing is inferred from the objects themselves.
pub fn scope_declarations(package: &str, scope: &Scope) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    for object in scope.objects() {
        match object {
            Object::Func { name, signature } => {
                declarations.push(Declaration::function(package, name, signature.clone()));
            }
            Object::Type { name, methods } => {
                declarations.extend(methods.iter().map(|method| {
                    Declaration::method(package, name, &method.name, method.signature.clone())
                }));
            }
            Object::Other { .. } => {}
        }
    }
    declarations
}

/// Resolves every package in turn; a failing package is recorded and skipped.
pub fn extract_declarations<R>(resolver: &mut R, packages: &[String]) -> Extraction
where
    R: TypeResolver + ?Sized,
{
    let mut extraction = Extraction::default();
    for package in packages {
        match resolver.resolve(package) {
            Ok(scope) => {
                let declarations = scope_declarations(package, &scope);
                debug!(package = %package, declarations = declarations.len(), "extracted declarations");
                extraction.declarations.extend(declarations);
            }
            Err(err) => {
                debug!(package = %package, error = %err, "skipping package");
                extraction.errors.push(err);
            }
        }
    }
    extraction
}
