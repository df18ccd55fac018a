// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod extraction;
pub mod filter;
pub mod formatting;
pub mod output;
pub mod resolver;

// Re-export commonly used types
pub use crate::core::{Declaration, Signature, Var};

pub use crate::commands::{collect_matches, run_search, SearchOutcome};
pub use crate::config::{load_config, SigfindConfig};
pub use crate::errors::{ResolveError, ResolveResult};
pub use crate::extraction::{extract_declarations, scope_declarations, Extraction};
pub use crate::filter::{check_types, MatchMode, TypeFilterSet};
pub use crate::formatting::{format_declaration, format_signature, strip_disambiguator};
pub use crate::output::MatchResult;
pub use crate::resolver::{
    expand_patterns, Importer, Object, PackageLocator, Scope, TypeResolver,
};
