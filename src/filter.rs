//! Selecting declarations by the types they take and return.
//!
//! Matching is exact string equality against the canonical type rendering;
//! there is no subtyping, alias resolution or structural comparison.

use crate::core::{Declaration, Signature, Var};

/// How the argument side and the return side are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Keep a declaration when any wanted type shows up on either side.
    #[default]
    Or,
    /// Keep a declaration only when every wanted type shows up on its side.
    And,
}

impl MatchMode {
    pub fn from_and_flag(and: bool) -> Self {
        if and {
            Self::And
        } else {
            Self::Or
        }
    }
}

/// Caller-supplied type names to look for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilterSet {
    pub args: Vec<String>,
    pub rets: Vec<String>,
    pub mode: MatchMode,
}

/// Outcome of testing one side of a signature against one filter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideMatch {
    /// At least one var has a wanted type.
    pub any: bool,
    /// Every wanted type is carried by at least one var.
    pub all: bool,
}

/// Tests `vars` against the `wanted` type names.
///
/// `all` is coverage of the filter list, not of the vars: a function with
/// extra parameters still fully covers a shorter list. An empty list is
/// covered vacuously and never produces `any`.
pub fn check_types(vars: &[Var], wanted: &[String]) -> SideMatch {
    let mut matched = vec![false; wanted.len()];
    let mut any = false;

    for var in vars {
        for (slot, candidate) in matched.iter_mut().zip(wanted) {
            if var.ty == *candidate {
                *slot = true;
                any = true;
            }
        }
    }

    SideMatch {
        any,
        all: matched.into_iter().all(|hit| hit),
    }
}

impl TypeFilterSet {
    pub fn new(args: Vec<String>, rets: Vec<String>, mode: MatchMode) -> Self {
        Self { args, rets, mode }
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.rets.is_empty()
    }

    pub fn matches_signature(&self, sig: &Signature) -> bool {
        let args = check_types(&sig.params, &self.args);
        let rets = check_types(&sig.results, &self.rets);

        match self.mode {
            MatchMode::Or => args.any || rets.any,
            MatchMode::And => args.all && rets.all,
        }
    }

    /// Declarations without a callable signature never match.
    pub fn matches(&self, decl: &Declaration) -> bool {
        decl.signature
            .as_ref()
            .is_some_and(|sig| self.matches_signature(sig))
    }
}
