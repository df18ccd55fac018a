use serde::{Deserialize, Serialize};

/// A named, typed slot in a signature: a parameter, a result or a receiver.
///
/// `name` may be empty (unnamed results, metadata without parameter names).
/// `ty` is the canonical rendering of the type and is what filters compare
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Var {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl Var {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// A var without a name, as used for most results.
    pub fn unnamed(ty: impl Into<String>) -> Self {
        Self::new(String::new(), ty)
    }
}

/// Callable signature of a function or method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Var>,
    #[serde(default)]
    pub params: Vec<Var>,
    #[serde(default)]
    pub results: Vec<Var>,
}

impl Signature {
    pub fn new(params: Vec<Var>, results: Vec<Var>) -> Self {
        Self {
            receiver: None,
            params,
            results,
        }
    }

    pub fn with_receiver(mut self, receiver: Var) -> Self {
        self.receiver = Some(receiver);
        self
    }
}

/// A function or method exposed by a package.
///
/// `package` is always set by whoever builds the declaration and never
/// derived from the signature: methods of types loaded from precompiled
/// metadata carry no package information of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub package: String,
    /// Type the function is declared on, for methods and associated functions.
    pub owner: Option<String>,
    pub name: String,
    /// `None` for intrinsics that have no callable signature.
    pub signature: Option<Signature>,
}

impl Declaration {
    pub fn function(
        package: impl Into<String>,
        name: impl Into<String>,
        signature: Option<Signature>,
    ) -> Self {
        Self {
            package: package.into(),
            owner: None,
            name: name.into(),
            signature,
        }
    }

    pub fn method(
        package: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
        signature: Option<Signature>,
    ) -> Self {
        Self {
            package: package.into(),
            owner: Some(owner.into()),
            name: name.into(),
            signature,
        }
    }
}
