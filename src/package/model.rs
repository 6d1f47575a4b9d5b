//! In-memory representation of a package being built or installed.

use crate::core::path::{to_archive_path, validate_package_name, DEPENDENCIES_DIR};
use crate::core::version::{SemanticVersion, VersionSpecifier};
use crate::core::{PackError, PackResult};
use crate::module::ModuleReference;
use crate::package::directive::{DirectiveKind, FileDirective};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

/// A file owned by a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageFile {
    /// Where the bytes currently live. Actions may point this at a transformed copy.
    #[serde(rename = "path")]
    pub source_path: PathBuf,

    /// Forward-slash path inside the package (defaults to `path`)
    #[serde(rename = "destination", default)]
    pub relative_destination_path: String,

    /// Modules this file needs, filled in by module-dependency discovery
    #[serde(rename = "references", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dependent_modules: BTreeSet<ModuleReference>,

    /// Module names this file references but that must never be resolved
    #[serde(rename = "ignore", default, skip_serializing_if = "BTreeSet::is_empty")]
    pub ignored_modules: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<FileDirective>,
}

impl PackageFile {
    pub fn new(source_path: PathBuf, relative_destination_path: &str) -> Self {
        Self {
            source_path,
            relative_destination_path: relative_destination_path.to_string(),
            dependent_modules: BTreeSet::new(),
            ignored_modules: BTreeSet::new(),
            directives: Vec::new(),
        }
    }

    pub fn with_directive(mut self, directive: FileDirective) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn has_directive(&self, kind: DirectiveKind) -> bool {
        self.directives.iter().any(|d| d.kind() == kind)
    }

    /// Remove and return the first directive of `kind`.
    pub fn take_directive(&mut self, kind: DirectiveKind) -> Option<FileDirective> {
        let pos = self.directives.iter().position(|d| d.kind() == kind)?;
        Some(self.directives.remove(pos))
    }

    /// Replace any directive of the same kind with `directive`.
    pub fn set_directive(&mut self, directive: FileDirective) {
        let kind = directive.kind();
        self.directives.retain(|d| d.kind() != kind);
        self.directives.push(directive);
    }

    /// Whether the file lives in the bundled-dependencies area of its package.
    pub fn is_bundled_payload(&self) -> bool {
        self.relative_destination_path
            .starts_with(&format!("{}/", DEPENDENCIES_DIR))
    }

    /// Destination file name (last path segment).
    pub fn file_name(&self) -> &str {
        self.relative_destination_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_destination_path)
    }
}

/// A dependency on another package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDependency {
    pub name: String,

    /// `None` until the resolver picks a specifier from the installed package
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionSpecifier>,
}

impl PackageDependency {
    pub fn new(name: &str, version: Option<VersionSpecifier>) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }
}

fn default_version() -> SemanticVersion {
    SemanticVersion::new(0, 0, 0)
}

/// A package: metadata, dependencies and files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageModel {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: SemanticVersion,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    /// Build time, stamped when the archive is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub dependencies: Vec<PackageDependency>,

    #[serde(default)]
    pub files: Vec<PackageFile>,
}

impl PackageModel {
    pub fn new(name: &str, version: SemanticVersion) -> Self {
        Self {
            name: name.to_string(),
            version,
            description: None,
            os: None,
            architecture: None,
            date: None,
            dependencies: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn dependency(&self, name: &str) -> Option<&PackageDependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependency(name).is_some()
    }

    /// Add a dependency, merging with an existing entry of the same name.
    ///
    /// Two specifiers for the same package are intersected; if no version can
    /// satisfy both the package data is invalid. Returns whether the
    /// dependency list changed.
    pub fn add_dependency(&mut self, dependency: PackageDependency) -> PackResult<bool> {
        let Some(pos) = self
            .dependencies
            .iter()
            .position(|d| d.name == dependency.name)
        else {
            self.dependencies.push(dependency);
            return Ok(true);
        };
        let existing = &mut self.dependencies[pos];

        let merged = match (&existing.version, &dependency.version) {
            (_, None) => return Ok(false),
            (None, Some(new)) => new.clone(),
            (Some(old), Some(new)) => old.intersect(new).ok_or_else(|| {
                PackError::Package(format!(
                    "Conflicting version requirements for dependency '{}': {} and {}",
                    dependency.name, old, new
                ))
            })?,
        };

        if existing.version.as_ref() == Some(&merged) {
            return Ok(false);
        }
        existing.version = Some(merged);
        Ok(true)
    }

    /// Merge duplicate dependency entries in place.
    pub fn normalize_dependencies(&mut self) -> PackResult<()> {
        let declared = std::mem::take(&mut self.dependencies);
        for dependency in declared {
            self.add_dependency(dependency)?;
        }
        Ok(())
    }

    pub fn file_by_destination(&self, destination: &str) -> Option<&PackageFile> {
        self.files
            .iter()
            .find(|f| f.relative_destination_path == destination)
    }

    /// Check name, destinations and dependency uniqueness.
    pub fn validate(&self) -> PackResult<()> {
        validate_package_name(&self.name)?;

        let mut destinations = HashSet::new();
        for file in &self.files {
            let normalized = to_archive_path(&file.relative_destination_path)?;
            if normalized != file.relative_destination_path {
                return Err(PackError::Package(format!(
                    "Destination '{}' is not normalized",
                    file.relative_destination_path
                )));
            }
            if !destinations.insert(normalized.to_lowercase()) {
                return Err(PackError::Package(format!(
                    "Duplicate file destination '{}'",
                    file.relative_destination_path
                )));
            }
        }

        let mut names = HashSet::new();
        for dependency in &self.dependencies {
            if !names.insert(dependency.name.as_str()) {
                return Err(PackError::Package(format!(
                    "Duplicate dependency '{}'",
                    dependency.name
                )));
            }
        }

        Ok(())
    }

    /// Every directive still attached to a file, except inert markers.
    pub fn unconsumed_directives(&self) -> Vec<(&PackageFile, &FileDirective)> {
        self.files
            .iter()
            .flat_map(|f| f.directives.iter().map(move |d| (f, d)))
            .filter(|(_, d)| !d.is_inert())
            .collect()
    }

    /// Fail if any non-inert directive was left behind by the pipeline.
    pub fn ensure_directives_consumed(&self) -> PackResult<()> {
        match self.unconsumed_directives().first() {
            Some((file, directive)) => Err(PackError::UnconsumedDirective {
                file: file.relative_destination_path.clone(),
                directive: directive.kind().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// The manifest embedded in the archive and read back after installation:
    /// file paths are the destinations and build-only data is dropped.
    pub fn to_installed_manifest(&self) -> PackageModel {
        let mut manifest = self.clone();
        for file in &mut manifest.files {
            file.source_path = PathBuf::from(&file.relative_destination_path);
            file.dependent_modules.clear();
            file.ignored_modules.clear();
        }
        manifest
    }
}
