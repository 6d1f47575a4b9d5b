//! Core types shared by the Plugpack crates: the error type, semantic
//! versions and version specifiers, and path conventions.

pub mod core;

pub use core::version::{is_compatible, SemanticVersion, VersionSpecifier};
pub use core::{PackError, PackResult};
