//! One-line signature rendering for matched declarations.

use crate::core::{Declaration, Signature, Var};

/// Separator precompiled metadata appends to parameter names to keep them
/// unique; everything from it onwards is noise for a reader.
pub const DISAMBIGUATION_MARK: char = '·';

/// Drops a metadata disambiguation suffix (`n·2` -> `n`).
pub fn strip_disambiguator(name: &str) -> &str {
    match name.find(DISAMBIGUATION_MARK) {
        Some(index) => &name[..index],
        None => name,
    }
}

fn format_var(var: &Var) -> String {
    let name = strip_disambiguator(&var.name);
    if name.is_empty() {
        var.ty.clone()
    } else {
        format!("{} {}", name, var.ty)
    }
}

/// Comma-joined `name Type` list; bare `Type` where the name is empty.
pub fn format_vars(vars: &[Var]) -> String {
    vars.iter().map(format_var).collect::<Vec<_>>().join(", ")
}

/// Renders `[(recv Type) ]Name(params) (results)`.
///
/// Associated functions without a receiver are shown as `Owner::name` so
/// they can be told apart from free functions of the same package.
pub fn format_signature(decl: &Declaration, sig: &Signature) -> String {
    let prefix = match &sig.receiver {
        Some(recv) => format!("({} {}) ", strip_disambiguator(&recv.name), recv.ty),
        None => String::new(),
    };

    let name = match (&decl.owner, &sig.receiver) {
        (Some(owner), None) => format!("{}::{}", owner, decl.name),
        _ => decl.name.clone(),
    };

    format!(
        "{}{}({}) ({})",
        prefix,
        name,
        format_vars(&sig.params),
        format_vars(&sig.results)
    )
}

/// Formats a declaration, or `None` for intrinsics without a signature.
pub fn format_declaration(decl: &Declaration) -> Option<String> {
    decl.signature
        .as_ref()
        .map(|sig| format_signature(decl, sig))
}
