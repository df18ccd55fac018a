//! Grouping matches by package and writing the report.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::errors::ResolveError;

pub const FALLBACK_BANNER: &str = "Relying on precompiled metadata for...";

/// Formatted signatures keyed by owning package.
///
/// Packages iterate in lexicographic order; signatures keep the order in
/// which they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    groups: BTreeMap<String, Vec<String>>,
}

impl MatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, package: &str, signature: String) {
        self.groups
            .entry(package.to_string())
            .or_default()
            .push(signature);
    }

    pub fn package_count(&self) -> usize {
        self.groups.len()
    }

    pub fn signature_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Writes one block per package: `pkg:`, tab-indented signatures, blank line.
    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        for (package, signatures) in &self.groups {
            writeln!(out, "{}:", package)?;
            for signature in signatures {
                writeln!(out, "\t{}", signature)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Writes package errors in the order they were encountered.
pub fn write_errors(out: &mut dyn Write, errors: &[ResolveError]) -> io::Result<()> {
    for err in errors {
        writeln!(out, "{}", err)?;
    }
    Ok(())
}

/// Lists packages whose scope came from fallback metadata; silent when empty.
pub fn write_fallbacks(out: &mut dyn Write, fallbacks: &[String]) -> io::Result<()> {
    if fallbacks.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", FALLBACK_BANNER)?;
    for path in fallbacks {
        writeln!(out, "{}", path)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(result: &MatchResult) -> String {
        let mut buf = Vec::new();
        result.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_packages_sorted_signatures_in_encounter_order() {
        let mut result = MatchResult::new();
        result.push("zeta", "b() ()".into());
        result.push("alpha", "z() ()".into());
        result.push("zeta", "a() ()".into());

        assert_eq!(
            render(&result),
            "alpha:\n\tz() ()\n\nzeta:\n\tb() ()\n\ta() ()\n\n"
        );
        assert_eq!(result.package_count(), 2);
        assert_eq!(result.signature_count(), 3);
    }

    #[test]
    fn test_empty_result_renders_nothing() {
        assert_eq!(render(&MatchResult::new()), "");
    }

    #[test]
    fn test_fallback_banner() {
        let mut buf = Vec::new();
        write_fallbacks(&mut buf, &["vendor/json".to_string()]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Relying on precompiled metadata for...\nvendor/json\n\n"
        );

        let mut quiet = Vec::new();
        write_fallbacks(&mut quiet, &[]).unwrap();
        assert!(quiet.is_empty());
    }
}
