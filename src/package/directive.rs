//! Per-file transform directives.
//!
//! A directive is attached to a file in the manifest and consumed (removed)
//! by exactly one pipeline action. `Hash` is the only inert marker: it is
//! written by the hashing action and kept in the final manifest.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileDirective {
    /// Sign the file with the named certificate.
    Sign { certificate: String },
    /// Run the configured obfuscator over the file.
    Obfuscate,
    /// The file is another package's manifest; add its dependencies to this package.
    InheritDependencies,
    /// Stamp the package version into the module's metadata.
    SetBinaryInfo,
    /// Take the package version from this file's module version.
    UseVersion,
    /// Checksum of the final file contents.
    Hash { algorithm: String, value: String },
}

/// Discriminant of a [`FileDirective`], for lookups that ignore payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Sign,
    Obfuscate,
    InheritDependencies,
    SetBinaryInfo,
    UseVersion,
    Hash,
}

impl FileDirective {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            FileDirective::Sign { .. } => DirectiveKind::Sign,
            FileDirective::Obfuscate => DirectiveKind::Obfuscate,
            FileDirective::InheritDependencies => DirectiveKind::InheritDependencies,
            FileDirective::SetBinaryInfo => DirectiveKind::SetBinaryInfo,
            FileDirective::UseVersion => DirectiveKind::UseVersion,
            FileDirective::Hash { .. } => DirectiveKind::Hash,
        }
    }

    /// Inert markers may remain on a file after the pipeline has run.
    pub fn is_inert(&self) -> bool {
        self.kind() == DirectiveKind::Hash
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DirectiveKind::Sign => "sign",
            DirectiveKind::Obfuscate => "obfuscate",
            DirectiveKind::InheritDependencies => "inherit_dependencies",
            DirectiveKind::SetBinaryInfo => "set_binary_info",
            DirectiveKind::UseVersion => "use_version",
            DirectiveKind::Hash => "hash",
        };
        f.write_str(name)
    }
}
