//! Loading `package.yaml` manifests with `$(NAME)` macro expansion.

use crate::core::path::to_archive_path;
use crate::core::{PackError, PackResult};
use crate::package::model::PackageModel;
use regex::Regex;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Macro holding the externally computed package version.
pub const GIT_VERSION_MACRO: &str = "GitVersion";

/// Values for `$(NAME)` macros.
///
/// Explicit definitions win; other names fall back to the process
/// environment when enabled.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    values: HashMap<String, String>,
    use_env: bool,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that resolves undefined names from environment variables.
    pub fn from_env() -> Self {
        Self {
            values: HashMap::new(),
            use_env: true,
        }
    }

    pub fn define(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    pub fn lookup(&self, name: &str) -> Option<String> {
        if let Some(value) = self.values.get(name) {
            return Some(value.clone());
        }
        if self.use_env {
            return std::env::var(name).ok();
        }
        None
    }

    /// Expand every `$(NAME)` in `text`. Undefined macros are invalid package data.
    pub fn expand(&self, text: &str) -> PackResult<String> {
        let re = Regex::new(r"\$\(([A-Za-z_][A-Za-z0-9_]*)\)")
            .map_err(|e| PackError::Package(format!("Invalid regex: {}", e)))?;

        if let Some(undefined) = re
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .find(|name| self.lookup(name).is_none())
        {
            return Err(PackError::Package(format!(
                "Macro '$({})' is not defined",
                undefined
            )));
        }

        let expanded = re.replace_all(text, |caps: &regex::Captures| {
            self.lookup(&caps[1]).unwrap_or_default()
        });
        Ok(expanded.into_owned())
    }

    fn expand_value(&self, value: &mut Value) -> PackResult<()> {
        match value {
            Value::String(s) => *s = self.expand(s)?,
            Value::Sequence(items) => {
                for item in items {
                    self.expand_value(item)?;
                }
            }
            Value::Mapping(map) => {
                for (_, item) in map.iter_mut() {
                    self.expand_value(item)?;
                }
            }
            Value::Tagged(tagged) => self.expand_value(&mut tagged.value)?,
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
        Ok(())
    }
}

/// Read a manifest and expand its macros, without interpreting it.
pub fn expand_manifest(path: &Path, macros: &MacroTable) -> PackResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        PackError::Package(format!("Failed to read manifest {}: {}", path.display(), e))
    })?;
    let mut value: Value = serde_yaml::from_str(&content)
        .map_err(|e| PackError::Package(format!("Invalid manifest {}: {}", path.display(), e)))?;
    macros.expand_value(&mut value)?;
    Ok(value)
}

/// Load a manifest into a [`PackageModel`].
///
/// File paths are resolved against `project_dir`; destinations default to
/// the file path and are normalized to forward slashes. Duplicate
/// dependencies are merged.
pub fn load_manifest(
    path: &Path,
    project_dir: &Path,
    macros: &MacroTable,
) -> PackResult<PackageModel> {
    let value = expand_manifest(path, macros)?;
    let mut pkg: PackageModel = serde_yaml::from_value(value)
        .map_err(|e| PackError::Package(format!("Invalid manifest {}: {}", path.display(), e)))?;

    for file in &mut pkg.files {
        let declared = file.source_path.to_string_lossy().into_owned();
        let destination = if file.relative_destination_path.is_empty() {
            declared.as_str()
        } else {
            file.relative_destination_path.as_str()
        };
        file.relative_destination_path = to_archive_path(destination)?;
        file.source_path = project_dir.join(&file.source_path);
    }

    pkg.normalize_dependencies()?;
    pkg.validate()?;

    tracing::debug!(
        name = %pkg.name,
        version = %pkg.version,
        files = pkg.files.len(),
        dependencies = pkg.dependencies.len(),
        "loaded manifest"
    );
    Ok(pkg)
}

/// Load an installed package's manifest (paths are already destinations).
pub fn load_installed_manifest(path: &Path) -> PackResult<PackageModel> {
    load_manifest(path, Path::new(""), &MacroTable::new())
}
