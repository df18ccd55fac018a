//! Package scopes: the top-level names of a package and their types.
//!
//! A scope is what the type-resolution service hands back for a package.
//! Its JSON form doubles as the precompiled metadata format, so scopes can
//! be loaded from disk for packages that are not parsed from source.

use serde::{Deserialize, Serialize};

use crate::core::Signature;

/// A method bound to a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: Option<Signature>,
}

/// A top-level object declared in a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Object {
    /// A function; `signature` is `None` for intrinsics.
    Func {
        name: String,
        #[serde(default)]
        signature: Option<Signature>,
    },
    /// A named type and its method set, in declaration order.
    Type {
        name: String,
        #[serde(default)]
        methods: Vec<Method>,
    },
    /// Anything else with a name: constants, statics, traits, modules.
    Other { name: String },
}

impl Object {
    pub fn name(&self) -> &str {
        match self {
            Object::Func { name, .. } | Object::Type { name, .. } | Object::Other { name } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    objects: Vec<Object>,
}

impl Scope {
    /// Builds a scope; objects are ordered by name, ties keep their order.
    pub fn new(path: impl Into<String>, mut objects: Vec<Object>) -> Self {
        objects.sort_by(|a, b| a.name().cmp(b.name()));
        Self {
            path: path.into(),
            objects,
        }
    }

    /// Parses precompiled metadata. The object order is normalised the same
    /// way as for scopes built from source.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: Scope = serde_json::from_str(json)?;
        Ok(Self::new(raw.path, raw.objects))
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(Object::name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|obj| obj.name() == name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
