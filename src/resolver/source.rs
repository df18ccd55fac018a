//! Building package scopes from parsed Rust source.

use std::collections::HashMap;
use std::fmt;

use quote::ToTokens;
use syn::{FnArg, ForeignItem, ImplItem, Item, Pat, ReturnType, Type, UseTree};
use tracing::trace;

use super::locator::SourceFile;
use super::render::{compact_tokens, AliasMap, TypeRenderer};
use super::scope::{Method, Object, Scope};
use crate::core::{Signature, Var};
use crate::errors::{ResolveError, ResolveResult};

/// Path roots that refer to the current package rather than another one.
const LOCAL_ROOTS: [&str; 3] = ["crate", "self", "super"];

/// ABI of foreign functions that have no callable signature.
const INTRINSIC_ABI: &str = "rust-intrinsic";

pub fn parse_source(package: &str, file: &SourceFile) -> ResolveResult<syn::File> {
    syn::parse_file(&file.contents).map_err(|e| {
        let start = e.span().start();
        ResolveError::Parse {
            path: package.to_string(),
            file: file.path.clone(),
            line: start.line,
            column: start.column + 1,
            message: e.to_string(),
        }
    })
}

/// One leaf of a `use` tree, or an `extern crate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub segments: Vec<String>,
    /// Local name the import binds, if any.
    pub alias: Option<String>,
    pub glob: bool,
}

impl Import {
    pub fn root(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn is_local(&self) -> bool {
        self.root().is_none_or(|root| LOCAL_ROOTS.contains(&root))
    }

    /// Package paths that could provide this import, longest first.
    pub fn candidates(&self) -> Vec<String> {
        (1..=self.segments.len())
            .rev()
            .map(|n| self.segments[..n].join("/"))
            .collect()
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("::"))?;
        if self.glob {
            write!(f, "::*")?;
        }
        Ok(())
    }
}

fn flatten_use(tree: &UseTree, prefix: &mut Vec<String>, out: &mut Vec<Import>) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            flatten_use(&path.tree, prefix, out);
            prefix.pop();
        }
        UseTree::Name(name) => {
            let ident = name.ident.to_string();
            let segments = leaf_segments(prefix, &ident);
            out.push(Import {
                alias: segments.last().cloned(),
                segments,
                glob: false,
            });
        }
        UseTree::Rename(rename) => {
            let alias = rename.rename.to_string();
            out.push(Import {
                segments: leaf_segments(prefix, &rename.ident.to_string()),
                alias: (alias != "_").then_some(alias),
                glob: false,
            });
        }
        UseTree::Glob(_) => out.push(Import {
            segments: prefix.clone(),
            alias: None,
            glob: true,
        }),
        UseTree::Group(group) => {
            for item in &group.items {
                flatten_use(item, prefix, out);
            }
        }
    }
}

/// `use a::b::{self}` imports `a::b`.
fn leaf_segments(prefix: &[String], ident: &str) -> Vec<String> {
    let mut segments = prefix.to_vec();
    if ident != "self" {
        segments.push(ident.to_string());
    }
    segments
}

/// Top-level `use` items and `extern crate` declarations of a file.
pub fn collect_imports(file: &syn::File) -> Vec<Import> {
    let mut imports = Vec::new();
    for item in &file.items {
        match item {
            Item::Use(item_use) => flatten_use(&item_use.tree, &mut Vec::new(), &mut imports),
            Item::ExternCrate(krate) if krate.ident != "self" => imports.push(Import {
                segments: vec![krate.ident.to_string()],
                alias: krate
                    .rename
                    .as_ref()
                    .map(|(_, rename)| rename.to_string()),
                glob: false,
            }),
            _ => {}
        }
    }
    imports
}

/// Names bound by imports from other packages, mapped to their full path.
pub fn collect_aliases(imports: &[Import]) -> AliasMap {
    imports
        .iter()
        .filter(|import| !import.glob && !import.is_local())
        .filter_map(|import| Some((import.alias.clone()?, import.segments.clone())))
        .collect()
}

fn pat_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(ident) => ident.ident.to_string(),
        Pat::Wild(_) => "_".to_string(),
        other => compact_tokens(other.to_token_stream()),
    }
}

fn convert_signature(sig: &syn::Signature, renderer: &TypeRenderer<'_>) -> Signature {
    let mut signature = Signature::default();
    for input in &sig.inputs {
        match input {
            FnArg::Receiver(receiver) => {
                signature.receiver = Some(Var::new("self", renderer.render(&receiver.ty)));
            }
            FnArg::Typed(typed) => signature
                .params
                .push(Var::new(pat_name(&typed.pat), renderer.render(&typed.ty))),
        }
    }
    if let Some(variadic) = &sig.variadic {
        let name = variadic
            .pat
            .as_ref()
            .map(|(pat, _)| pat_name(pat))
            .unwrap_or_default();
        signature.params.push(Var::new(name, "..."));
    }
    if let ReturnType::Type(_, ty) = &sig.output {
        signature.results.push(Var::unnamed(renderer.render(ty)));
    }
    signature
}

/// Name of the type an impl block attaches to, when it is a plain local name.
fn impl_target(self_ty: &Type) -> Option<String> {
    match self_ty {
        Type::Path(path) if path.qself.is_none() && path.path.leading_colon.is_none() => {
            let segments = &path.path.segments;
            (segments.len() == 1).then(|| segments[0].ident.to_string())
        }
        Type::Group(group) => impl_target(&group.elem),
        _ => None,
    }
}

#[derive(Default)]
struct ScopeBuilder {
    objects: Vec<Object>,
    /// Named types in declaration order.
    types: Vec<String>,
    /// Methods per type name, collected before the types are known.
    methods: HashMap<String, Vec<Method>>,
}

impl ScopeBuilder {
    fn add_file(&mut self, file: &syn::File) {
        let imports = collect_imports(file);
        let aliases = collect_aliases(&imports);
        let renderer = TypeRenderer::new(&aliases);

        for item in &file.items {
            match item {
                Item::Fn(func) => self.objects.push(Object::Func {
                    name: func.sig.ident.to_string(),
                    signature: Some(convert_signature(&func.sig, &renderer)),
                }),
                Item::ForeignMod(foreign) => {
                    let intrinsic = foreign
                        .abi
                        .name
                        .as_ref()
                        .is_some_and(|abi| abi.value() == INTRINSIC_ABI);
                    for foreign_item in &foreign.items {
                        self.add_foreign_item(foreign_item, intrinsic, &renderer);
                    }
                }
                Item::Struct(item) => self.types.push(item.ident.to_string()),
                Item::Enum(item) => self.types.push(item.ident.to_string()),
                Item::Union(item) => self.types.push(item.ident.to_string()),
                Item::Type(item) => self.types.push(item.ident.to_string()),
                Item::Impl(imp) => self.add_impl(imp, &aliases),
                Item::Const(item) => self.push_other(&item.ident),
                Item::Static(item) => self.push_other(&item.ident),
                Item::Trait(item) => self.push_other(&item.ident),
                Item::TraitAlias(item) => self.push_other(&item.ident),
                Item::Mod(item) => self.push_other(&item.ident),
                Item::Macro(item) => {
                    if let Some(ident) = &item.ident {
                        self.push_other(ident);
                    }
                }
                _ => {}
            }
        }
    }

    fn push_other(&mut self, ident: &syn::Ident) {
        self.objects.push(Object::Other {
            name: ident.to_string(),
        });
    }

    fn add_foreign_item(&mut self, item: &ForeignItem, intrinsic: bool, renderer: &TypeRenderer<'_>) {
        match item {
            ForeignItem::Fn(func) => self.objects.push(Object::Func {
                name: func.sig.ident.to_string(),
                signature: (!intrinsic).then(|| convert_signature(&func.sig, renderer)),
            }),
            ForeignItem::Static(item) => self.push_other(&item.ident),
            ForeignItem::Type(item) => self.types.push(item.ident.to_string()),
            _ => {}
        }
    }

    fn add_impl(&mut self, imp: &syn::ItemImpl, aliases: &AliasMap) {
        let Some(target) = impl_target(&imp.self_ty) else {
            trace!("skipping impl block for a non-local type");
            return;
        };
        let self_ty = TypeRenderer::new(aliases).render(&imp.self_ty);
        let renderer = TypeRenderer::new(aliases).with_self(&self_ty);

        let methods = self.methods.entry(target).or_default();
        for item in &imp.items {
            if let ImplItem::Fn(func) = item {
                methods.push(Method {
                    name: func.sig.ident.to_string(),
                    signature: Some(convert_signature(&func.sig, &renderer)),
                });
            }
        }
    }

    fn finish(mut self, path: &str) -> Scope {
        for name in std::mem::take(&mut self.types) {
            let methods = self.methods.remove(&name).unwrap_or_default();
            self.objects.push(Object::Type { name, methods });
        }
        for (target, methods) in &self.methods {
            trace!(package = path, type_name = %target, methods = methods.len(), "dropping methods of a type declared elsewhere");
        }
        Scope::new(path, self.objects)
    }
}

/// Collects the top-level objects of all files of a package.
pub fn build_scope(path: &str, files: &[syn::File]) -> Scope {
    let mut builder = ScopeBuilder::default();
    for file in files {
        builder.add_file(file);
    }
    builder.finish(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn parse(src: &str) -> syn::File {
        syn::parse_file(src).unwrap()
    }

    fn func_signature<'a>(scope: &'a Scope, name: &str) -> Option<&'a Signature> {
        match scope.lookup(name) {
            Some(Object::Func { signature, .. }) => signature.as_ref(),
            other => panic!("expected function {name}, got {other:?}"),
        }
    }

    fn methods<'a>(scope: &'a Scope, name: &str) -> &'a [Method] {
        match scope.lookup(name) {
            Some(Object::Type { methods, .. }) => methods,
            other => panic!("expected type {name}, got {other:?}"),
        }
    }

    #[test]
    fn test_collect_imports_flattens_trees() {
        let file = parse(indoc! {"
            use std::io::{self, Write as W, prelude::*};
            use crate::model::Point;
            extern crate serde as sd;
        "});
        let imports = collect_imports(&file);
        let rendered: Vec<String> = imports.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "std::io",
                "std::io::Write",
                "std::io::prelude::*",
                "crate::model::Point",
                "serde"
            ]
        );
        assert_eq!(imports[1].alias.as_deref(), Some("W"));
        assert_eq!(imports[4].alias.as_deref(), Some("sd"));
        assert!(imports[3].is_local());
    }

    #[test]
    fn test_candidates_longest_first() {
        let import = Import {
            segments: vec!["a".into(), "b".into(), "C".into()],
            alias: Some("C".into()),
            glob: false,
        };
        assert_eq!(import.candidates(), vec!["a/b/C", "a/b", "a"]);
    }

    #[test]
    fn test_aliases_skip_local_and_glob() {
        let file = parse("use std::io; use crate::x::Y; use std::fmt::*;");
        let aliases = collect_aliases(&collect_imports(&file));
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases["io"], vec!["std".to_string(), "io".to_string()]);
    }

    #[test]
    fn test_free_functions_and_imported_types() {
        let file = parse(indoc! {"
            use std::io;
            pub fn copy(reader: &mut dyn io::Read, _: usize) -> io::Result<u64> { todo!() }
            fn ignore(mut buf: Vec<u8>) {}
        "});
        let scope = build_scope("util", &[file]);

        let copy = func_signature(&scope, "copy").unwrap();
        assert_eq!(
            copy.params,
            vec![
                Var::new("reader", "&mut dyn std::io::Read"),
                Var::new("_", "usize")
            ]
        );
        assert_eq!(copy.results, vec![Var::unnamed("std::io::Result<u64>")]);

        let ignore = func_signature(&scope, "ignore").unwrap();
        assert_eq!(ignore.params, vec![Var::new("buf", "Vec<u8>")]);
        assert!(ignore.results.is_empty());
    }

    #[test]
    fn test_methods_attach_across_files_in_order() {
        let impls = parse(indoc! {"
            impl Point {
                pub fn new(x: f64, y: f64) -> Self { Point { x, y } }
                pub fn norm(&self) -> f64 { 0.0 }
            }
            impl std::fmt::Display for Point {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { Ok(()) }
            }
            impl Missing { fn lost(&self) {} }
        "});
        let types = parse("pub struct Point { x: f64, y: f64 }");
        let scope = build_scope("geo", &[impls, types]);

        let methods = methods(&scope, "Point");
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["new", "norm", "fmt"]);

        let new = methods[0].signature.as_ref().unwrap();
        assert_eq!(new.receiver, None);
        assert_eq!(new.results, vec![Var::unnamed("Point")]);

        let norm = methods[1].signature.as_ref().unwrap();
        assert_eq!(norm.receiver, Some(Var::new("self", "&Point")));

        assert!(scope.lookup("Missing").is_none());
    }

    #[test]
    fn test_generic_impl_renders_self_with_parameters() {
        let file = parse(indoc! {"
            pub struct Stack<T>(Vec<T>);
            impl<T> Stack<T> {
                pub fn push(&mut self, item: T) {}
                pub fn into_inner(self: Box<Self>) -> Vec<T> { todo!() }
            }
        "});
        let scope = build_scope("stack", &[file]);
        let methods = methods(&scope, "Stack");

        let push = methods[0].signature.as_ref().unwrap();
        assert_eq!(push.receiver, Some(Var::new("self", "&mut Stack<T>")));
        assert_eq!(push.params, vec![Var::new("item", "T")]);

        let into_inner = methods[1].signature.as_ref().unwrap();
        assert_eq!(into_inner.receiver, Some(Var::new("self", "Box<Stack<T>>")));
    }

    #[test]
    fn test_intrinsics_have_no_signature() {
        let file = parse(indoc! {r#"
            extern "rust-intrinsic" {
                fn abort() -> !;
            }
            extern "C" {
                fn strlen(s: *const u8, ...) -> usize;
            }
        "#});
        let scope = build_scope("sys", &[file]);

        assert_eq!(func_signature(&scope, "abort"), None);
        let strlen = func_signature(&scope, "strlen").unwrap();
        assert_eq!(
            strlen.params,
            vec![Var::new("s", "*const u8"), Var::new("", "...")]
        );
    }

    #[test]
    fn test_other_items_are_named_but_not_callable() {
        let file = parse(indoc! {"
            pub const LIMIT: usize = 4;
            pub static NAME: &str = \"x\";
            pub trait Shape { fn area(&self) -> f64; }
            pub mod inner { pub fn hidden() {} }
            macro_rules! m { () => {} }
        "});
        let scope = build_scope("misc", &[file]);
        let names: Vec<&str> = scope.names().collect();
        assert_eq!(names, vec!["LIMIT", "NAME", "Shape", "inner", "m"]);
        assert!(scope
            .objects()
            .iter()
            .all(|obj| matches!(obj, Object::Other { .. })));
    }

    #[test]
    fn test_parse_error_carries_location() {
        let file = SourceFile {
            path: PathBuf::from("broken/lib.rs"),
            contents: "pub fn ok() {}\nlet broken = 1;\n".to_string(),
        };
        match parse_source("broken", &file) {
            Err(ResolveError::Parse { path, line, .. }) => {
                assert_eq!(path, "broken");
                assert_eq!(line, 2);
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }
}
