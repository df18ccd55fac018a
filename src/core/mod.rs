//! Core data model shared by the resolver, the filter and the reporter.

pub mod types;

pub use types::{Declaration, Signature, Var};
