use crate::core::version::SemanticVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A module a file needs: a name at a minimum version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleReference {
    pub name: String,
    pub version: SemanticVersion,
}

impl ModuleReference {
    pub fn new(name: &str, version: SemanticVersion) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }
}

impl fmt::Display for ModuleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// A module found on disk by a [`super::ModuleIndex`].
///
/// Identity is `(name, location)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub name: String,
    pub version: SemanticVersion,
    pub location: PathBuf,
    pub references: Vec<ModuleReference>,
}

impl ModuleRecord {
    pub fn new(name: &str, version: SemanticVersion, location: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            version,
            location,
            references: Vec::new(),
        }
    }

    pub fn with_reference(mut self, name: &str, version: SemanticVersion) -> Self {
        self.references.push(ModuleReference::new(name, version));
        self
    }
}
