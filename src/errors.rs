//! Per-package errors produced while resolving packages.
//!
//! None of these are fatal: the extractor collects them, the search command
//! prints them one per line and keeps going with the remaining packages.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The package could not be located or loaded at all.
    #[error("Couldn't import {path}: {reason}")]
    Import { path: String, reason: String },

    /// The package directory exists but has nothing to parse.
    #[error("Couldn't parse {path}: no (non-gated) source files")]
    NoSourceFiles { path: String },

    /// A source file failed to parse; the rest of the package is not read.
    #[error("Couldn't parse {path}: {}:{line}:{column}: {message}", .file.display())]
    Parse {
        path: String,
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The package parsed but its imports could not all be resolved.
    #[error("Couldn't check {path}: {message}")]
    Check { path: String, message: String },

    /// Precompiled metadata exists but is unreadable or malformed.
    #[error("Couldn't import {path}: invalid metadata in {}: {message}", .file.display())]
    Metadata {
        path: String,
        file: PathBuf,
        message: String,
    },
}

impl ResolveError {
    pub fn import(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Import {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn check(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Check {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Package path the error is about.
    pub fn package(&self) -> &str {
        match self {
            Self::Import { path, .. }
            | Self::NoSourceFiles { path }
            | Self::Parse { path, .. }
            | Self::Check { path, .. }
            | Self::Metadata { path, .. } => path,
        }
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;
