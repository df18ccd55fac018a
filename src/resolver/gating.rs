//! Deciding whether a source file is compiled for the host.
//!
//! A file is gated out when one of its leading inner `#![cfg(...)]`
//! attributes does not hold for the host build. Searches look at a normal
//! (non-test) build. Predicates that cannot be decided here, such as
//! features, count as not holding.

use std::env::consts;

use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token};

/// The inner attributes at the top of a file; the rest is only lexed.
struct FileHeader {
    attrs: Vec<Attribute>,
}

impl Parse for FileHeader {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_inner)?;
        input.parse::<proc_macro2::TokenStream>()?;
        Ok(Self { attrs })
    }
}

/// Drops a byte order mark and a shebang line, which are not tokens.
fn strip_preamble(source: &str) -> &str {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    if source.starts_with("#!") && !source[2..].trim_start().starts_with('[') {
        return source.find('\n').map_or("", |end| &source[end..]);
    }
    source
}

/// Whether the file is excluded from the host build by a leading `cfg`.
///
/// Files that do not even lex are kept, so that parsing reports them.
pub fn is_gated(source: &str) -> bool {
    let Ok(header) = syn::parse_str::<FileHeader>(strip_preamble(source)) else {
        return false;
    };
    header
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("cfg"))
        .any(|attr| match attr.parse_args::<Meta>() {
            Ok(predicate) => cfg_holds(&predicate) != Some(true),
            Err(_) => true,
        })
}

/// Evaluates a `cfg` predicate for the host; `None` when undecidable.
pub fn cfg_holds(predicate: &Meta) -> Option<bool> {
    match predicate {
        Meta::Path(path) => {
            let ident = path.get_ident()?.to_string();
            match ident.as_str() {
                "unix" => Some(cfg!(unix)),
                "windows" => Some(cfg!(windows)),
                "debug_assertions" => Some(cfg!(debug_assertions)),
                "test" | "doc" | "doctest" => Some(false),
                _ => None,
            }
        }
        Meta::NameValue(pair) => {
            let key = pair.path.get_ident()?.to_string();
            let Expr::Lit(ExprLit {
                lit: Lit::Str(value),
                ..
            }) = &pair.value
            else {
                return None;
            };
            let host = match key.as_str() {
                "target_os" => consts::OS,
                "target_family" => consts::FAMILY,
                "target_arch" => consts::ARCH,
                _ => return None,
            };
            Some(value.value() == host)
        }
        Meta::List(list) => {
            let name = list.path.get_ident()?.to_string();
            let nested = list
                .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .ok()?;
            let values: Vec<Option<bool>> = nested.iter().map(cfg_holds).collect();
            match name.as_str() {
                "not" if values.len() == 1 => values[0].map(|v| !v),
                "all" => {
                    if values.contains(&Some(false)) {
                        Some(false)
                    } else if values.contains(&None) {
                        None
                    } else {
                        Some(true)
                    }
                }
                "any" => {
                    if values.contains(&Some(true)) {
                        Some(true)
                    } else if values.contains(&None) {
                        None
                    } else {
                        Some(false)
                    }
                }
                _ => None,
            }
        }
    }
}
