//! Plugpack: builds versioned, signed plugin package archives.
//!
//! A package manifest lists the files of a plugin. Building it stamps the
//! version, transforms files through an ordered action pipeline (obfuscation,
//! signing, hashing), resolves the binary modules the files reference into
//! package dependencies or bundled payload, and writes a zip archive with the
//! final manifest embedded.

pub use plugpack_core::{PackError, PackResult};

/// Core types re-exported from `plugpack-core`.
pub use plugpack_core::core;

/// Configuration management.
pub mod config;

/// Package model, manifests, installation, archives and verification.
pub mod package;

/// Module discovery.
pub mod module;

/// Dependency resolution.
pub mod resolver;

/// Build pipeline and default actions.
pub mod pipeline;

/// End-to-end package creation.
pub mod build;
