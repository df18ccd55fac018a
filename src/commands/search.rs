//! The search pipeline: resolve, extract, filter, format, report.

use std::io::Write;

use anyhow::{Context, Result};

use crate::core::Declaration;
use crate::extraction::extract_declarations;
use crate::filter::TypeFilterSet;
use crate::formatting::format_declaration;
use crate::output::{write_errors, write_fallbacks, MatchResult};
use crate::resolver::TypeResolver;

#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub matches: MatchResult,
    pub declarations: usize,
    pub errors: usize,
}

/// Groups the formatted signatures of matching declarations by package.
pub fn collect_matches(declarations: &[Declaration], filter: &TypeFilterSet) -> MatchResult {
    let mut matches = MatchResult::new();
    for decl in declarations.iter().filter(|decl| filter.matches(decl)) {
        if let Some(signature) = format_declaration(decl) {
            matches.push(&decl.package, signature);
        }
    }
    matches
}

/// Runs one search and writes it out.
///
/// Package errors go to `err` first, then the fallback banner, then the
/// report to `out`. Package errors never fail the search; only write
/// failures do.
pub fn run_search<R>(
    resolver: &mut R,
    packages: &[String],
    filter: &TypeFilterSet,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<SearchOutcome>
where
    R: TypeResolver + ?Sized,
{
    let extraction = extract_declarations(resolver, packages);

    write_errors(err, &extraction.errors).context("Failed to write package errors")?;
    write_fallbacks(err, resolver.fallbacks()).context("Failed to write fallback packages")?;

    let matches = collect_matches(&extraction.declarations, filter);
    matches.write_to(out).context("Failed to write report")?;
    out.flush().context("Failed to flush report")?;

    Ok(SearchOutcome {
        matches,
        declarations: extraction.declarations.len(),
        errors: extraction.errors.len(),
    })
}
