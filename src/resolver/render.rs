//! Canonical text for `syn` types.
//!
//! Filters compare types by string equality, so every type is rendered the
//! same way no matter how it was spelled in source: no incidental
//! whitespace, imported names expanded to their full `use` path, and `Self`
//! replaced by the type of the enclosing impl block.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::{
    GenericArgument, Path, PathArguments, PathSegment, ReturnType, Type, TypeParamBound,
    TypePath,
};

/// Maps a name introduced by `use` to the full path it stands for.
pub type AliasMap = HashMap<String, Vec<String>>;

pub struct TypeRenderer<'a> {
    aliases: &'a AliasMap,
    self_ty: Option<&'a str>,
}

impl<'a> TypeRenderer<'a> {
    pub fn new(aliases: &'a AliasMap) -> Self {
        Self {
            aliases,
            self_ty: None,
        }
    }

    /// Renders `Self` as `self_ty` from now on.
    pub fn with_self(self, self_ty: &'a str) -> Self {
        Self {
            self_ty: Some(self_ty),
            ..self
        }
    }

    pub fn render(&self, ty: &Type) -> String {
        match ty {
            Type::Array(array) => format!(
                "[{}; {}]",
                self.render(&array.elem),
                compact_tokens(array.len.to_token_stream())
            ),
            Type::BareFn(bare) => {
                let mut out = String::new();
                if let Some(lifetimes) = &bare.lifetimes {
                    out.push_str(&compact_tokens(lifetimes.to_token_stream()));
                    out.push(' ');
                }
                if bare.unsafety.is_some() {
                    out.push_str("unsafe ");
                }
                if let Some(abi) = &bare.abi {
                    match &abi.name {
                        Some(name) => out.push_str(&format!("extern \"{}\" ", name.value())),
                        None => out.push_str("extern "),
                    }
                }
                let mut inputs: Vec<String> =
                    bare.inputs.iter().map(|arg| self.render(&arg.ty)).collect();
                if bare.variadic.is_some() {
                    inputs.push("...".to_string());
                }
                out.push_str(&format!(
                    "fn({}){}",
                    inputs.join(", "),
                    self.render_return(&bare.output)
                ));
                out
            }
            Type::Group(group) => self.render(&group.elem),
            Type::ImplTrait(imp) => format!("impl {}", self.render_bounds(&imp.bounds)),
            Type::Infer(_) => "_".to_string(),
            Type::Macro(mac) => compact_tokens(mac.to_token_stream()),
            Type::Never(_) => "!".to_string(),
            Type::Paren(paren) => format!("({})", self.render(&paren.elem)),
            Type::Path(path) => self.render_type_path(path),
            Type::Ptr(ptr) => {
                let kind = if ptr.mutability.is_some() {
                    "mut"
                } else {
                    "const"
                };
                format!("*{} {}", kind, self.render(&ptr.elem))
            }
            Type::Reference(reference) => {
                let mut out = String::from("&");
                if let Some(lifetime) = &reference.lifetime {
                    out.push_str(&lifetime.to_string());
                    out.push(' ');
                }
                if reference.mutability.is_some() {
                    out.push_str("mut ");
                }
                out.push_str(&self.render(&reference.elem));
                out
            }
            Type::Slice(slice) => format!("[{}]", self.render(&slice.elem)),
            Type::TraitObject(object) => format!("dyn {}", self.render_bounds(&object.bounds)),
            Type::Tuple(tuple) => {
                let elems: Vec<String> = tuple.elems.iter().map(|t| self.render(t)).collect();
                if elems.len() == 1 {
                    format!("({},)", elems[0])
                } else {
                    format!("({})", elems.join(", "))
                }
            }
            Type::Verbatim(tokens) => compact_tokens(tokens.clone()),
            other => compact_tokens(other.to_token_stream()),
        }
    }

    fn render_type_path(&self, ty: &TypePath) -> String {
        let Some(qself) = &ty.qself else {
            if let (Some(self_ty), true) = (self.self_ty, ty.path.is_ident("Self")) {
                return self_ty.to_string();
            }
            return self.render_path(&ty.path);
        };

        let inner = self.render(&qself.ty);
        let segments: Vec<&PathSegment> = ty.path.segments.iter().collect();
        let position = qself.position.min(segments.len());
        let rest = segments[position..]
            .iter()
            .map(|seg| self.render_segment(seg))
            .collect::<Vec<_>>()
            .join("::");

        if qself.as_token.is_none() || position == 0 {
            return format!("<{}>::{}", inner, rest);
        }

        let trait_path = Path {
            leading_colon: ty.path.leading_colon,
            segments: segments[..position].iter().map(|seg| (*seg).clone()).collect(),
        };
        format!("<{} as {}>::{}", inner, self.render_path(&trait_path), rest)
    }

    /// Renders a path, expanding a leading imported name to its `use` path.
    pub fn render_path(&self, path: &Path) -> String {
        let mut parts: Vec<String> = path
            .segments
            .iter()
            .map(|seg| self.render_segment(seg))
            .collect();

        if path.leading_colon.is_some() {
            return format!("::{}", parts.join("::"));
        }

        if let Some(first) = path.segments.first() {
            if let Some(full) = self.aliases.get(&first.ident.to_string()) {
                if let Some((last, head)) = full.split_last() {
                    parts[0] = format!("{}{}", last, self.render_arguments(&first.arguments));
                    let mut expanded = head.to_vec();
                    expanded.extend(parts);
                    parts = expanded;
                }
            }
        }

        parts.join("::")
    }

    fn render_segment(&self, segment: &PathSegment) -> String {
        format!(
            "{}{}",
            segment.ident,
            self.render_arguments(&segment.arguments)
        )
    }

    fn render_arguments(&self, arguments: &PathArguments) -> String {
        match arguments {
            PathArguments::None => String::new(),
            PathArguments::AngleBracketed(angle) => {
                let args: Vec<String> = angle
                    .args
                    .iter()
                    .map(|arg| self.render_generic_argument(arg))
                    .collect();
                format!("<{}>", args.join(", "))
            }
            PathArguments::Parenthesized(paren) => {
                let inputs: Vec<String> = paren.inputs.iter().map(|t| self.render(t)).collect();
                format!("({}){}", inputs.join(", "), self.render_return(&paren.output))
            }
        }
    }

    fn render_generic_argument(&self, arg: &GenericArgument) -> String {
        match arg {
            GenericArgument::Lifetime(lifetime) => lifetime.to_string(),
            GenericArgument::Type(ty) => self.render(ty),
            GenericArgument::Const(expr) => compact_tokens(expr.to_token_stream()),
            GenericArgument::AssocType(assoc) => {
                let generics = assoc
                    .generics
                    .as_ref()
                    .map(|g| compact_tokens(g.to_token_stream()))
                    .unwrap_or_default();
                format!("{}{} = {}", assoc.ident, generics, self.render(&assoc.ty))
            }
            GenericArgument::AssocConst(assoc) => format!(
                "{} = {}",
                assoc.ident,
                compact_tokens(assoc.value.to_token_stream())
            ),
            GenericArgument::Constraint(constraint) => format!(
                "{}: {}",
                constraint.ident,
                self.render_bounds(&constraint.bounds)
            ),
            other => compact_tokens(other.to_token_stream()),
        }
    }

    fn render_bounds<P>(&self, bounds: &Punctuated<TypeParamBound, P>) -> String {
        bounds
            .iter()
            .map(|bound| match bound {
                TypeParamBound::Trait(trait_bound) => {
                    let mut out = String::new();
                    if let Some(lifetimes) = &trait_bound.lifetimes {
                        out.push_str(&compact_tokens(lifetimes.to_token_stream()));
                        out.push(' ');
                    }
                    if matches!(trait_bound.modifier, syn::TraitBoundModifier::Maybe(_)) {
                        out.push('?');
                    }
                    out.push_str(&self.render_path(&trait_bound.path));
                    out
                }
                TypeParamBound::Lifetime(lifetime) => lifetime.to_string(),
                other => compact_tokens(other.to_token_stream()),
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }

    fn render_return(&self, output: &ReturnType) -> String {
        match output {
            ReturnType::Default => String::new(),
            ReturnType::Type(_, ty) => format!(" -> {}", self.render(ty)),
        }
    }
}

/// Prints tokens without the spaces `proc_macro2` puts between them, keeping
/// a space only where two words would otherwise run together.
pub fn compact_tokens(tokens: TokenStream) -> String {
    let text = tokens.to_string();
    let chars: Vec<char> = text.chars().collect();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.get(i + 1).copied();
            if let (Some(p), Some(n)) = (prev, next) {
                if is_word(p) && is_word(n) {
                    out.push(' ');
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}
