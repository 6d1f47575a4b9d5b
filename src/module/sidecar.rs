use super::{upsert, ModuleIndex, ModuleRecord, ModuleReference};
use crate::core::version::SemanticVersion;
use crate::core::{PackError, PackResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions treated as binary modules.
pub const MODULE_EXTENSIONS: &[&str] = &["dll", "exe", "so", "dylib"];

/// Suffix appended to a module's file name to form its metadata file.
pub const SIDECAR_SUFFIX: &str = ".module.yaml";

/// Contents of a `<module>.module.yaml` metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub version: SemanticVersion,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ModuleReference>,
}

impl ModuleMetadata {
    pub fn load(path: &Path) -> PackResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            PackError::Package(format!(
                "Invalid module metadata {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn save(&self, path: &Path) -> PackResult<()> {
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

/// Module index reading metadata from sidecar files.
///
/// Every file with a module extension is a module. Its name, version and
/// references come from `<file>.module.yaml` next to it; without one the
/// module is named after the file stem, versioned `0.0.0`, and references
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct SidecarModuleIndex {
    records: Vec<ModuleRecord>,
}

impl SidecarModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the module at `path`.
    pub fn read_module(path: &Path) -> PackResult<ModuleRecord> {
        let sidecar = sidecar_path(path);

        if sidecar.exists() {
            let metadata = ModuleMetadata::load(&sidecar)?;
            return Ok(ModuleRecord {
                name: metadata.name,
                version: metadata.version,
                location: path.to_path_buf(),
                references: metadata.references,
            });
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PackError::Path(format!("Invalid module path: {}", path.display())))?;
        Ok(ModuleRecord::new(
            name,
            SemanticVersion::new(0, 0, 0),
            path.to_path_buf(),
        ))
    }
}

impl ModuleIndex for SidecarModuleIndex {
    fn search(&mut self, root: &Path) -> PackResult<Vec<ModuleRecord>> {
        if !root.exists() {
            tracing::debug!(root = %root.display(), "search root does not exist");
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_module_file(entry.path()) {
                continue;
            }
            let record = Self::read_module(entry.path())?;
            upsert(&mut self.records, record.clone());
            found.push(record);
        }

        tracing::debug!(root = %root.display(), count = found.len(), "indexed modules");
        Ok(found)
    }

    fn modules(&self) -> &[ModuleRecord] {
        &self.records
    }

    fn register(&mut self, record: ModuleRecord) {
        upsert(&mut self.records, record);
    }
}

/// Whether `path` has one of the [`MODULE_EXTENSIONS`].
pub fn is_module_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            MODULE_EXTENSIONS
                .iter()
                .any(|m| e.eq_ignore_ascii_case(m))
        })
        .unwrap_or(false)
}

/// Location of the metadata file for the module at `module_path`.
pub fn sidecar_path(module_path: &Path) -> PathBuf {
    let mut name = module_path.as_os_str().to_os_string();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}
