use crate::module::{ModuleIndex, ModuleRecord};
use crate::package::model::{PackageFile, PackageModel};
use std::collections::HashMap;
use std::path::PathBuf;

/// A module supplied by a package.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferedModule {
    pub record: ModuleRecord,
    /// Whether the module is bundled payload under `Dependencies/`
    pub bundled: bool,
}

/// Cache of the modules each package offers, keyed by package name and version.
///
/// Entries must be invalidated whenever the file list of the package changes.
#[derive(Debug, Default)]
pub struct OfferedModules {
    cache: HashMap<(String, String), Vec<OfferedModule>>,
}

impl OfferedModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modules offered by `pkg`, computed on first use.
    ///
    /// `locate` maps a package file to the path the index knows it by.
    pub fn get<F>(&mut self, pkg: &PackageModel, index: &dyn ModuleIndex, locate: F) -> &[OfferedModule]
    where
        F: Fn(&PackageFile) -> PathBuf,
    {
        let key = (pkg.name.clone(), pkg.version.to_string());
        self.cache.entry(key).or_insert_with(|| {
            pkg.files
                .iter()
                .filter_map(|file| {
                    index.find_at(&locate(file)).map(|record| OfferedModule {
                        record: record.clone(),
                        bundled: file.is_bundled_payload(),
                    })
                })
                .collect()
        })
    }

    pub fn invalidate(&mut self, name: &str, version: &str) {
        self.cache.remove(&(name.to_string(), version.to_string()));
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
