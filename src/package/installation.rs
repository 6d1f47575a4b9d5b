use crate::core::path::{MANIFEST_FILE, PACKAGES_DIR};
use crate::core::PackResult;
use crate::package::manifest::load_installed_manifest;
use crate::package::model::{PackageFile, PackageModel};
use std::fs;
use std::path::{Path, PathBuf};

/// The packages installed in an installation directory.
///
/// Each package has its manifest at `<root>/Packages/<name>/package.yaml`;
/// its file destinations are relative to `<root>`. Packages are kept in
/// lexicographic name order, which is also the resolver's tie-break order.
#[derive(Debug, Clone)]
pub struct Installation {
    root: PathBuf,
    packages: Vec<PackageModel>,
}

impl Installation {
    /// Read every installed package manifest under `root`.
    ///
    /// Unreadable manifests are skipped with a warning.
    pub fn load(root: &Path) -> PackResult<Self> {
        let packages_dir = root.join(PACKAGES_DIR);
        let mut packages = Vec::new();

        if packages_dir.is_dir() {
            for entry in fs::read_dir(&packages_dir)? {
                let manifest = entry?.path().join(MANIFEST_FILE);
                if !manifest.is_file() {
                    continue;
                }
                match load_installed_manifest(&manifest) {
                    Ok(pkg) => packages.push(pkg),
                    Err(e) => tracing::warn!(
                        manifest = %manifest.display(),
                        error = %e,
                        "skipping unreadable installed package"
                    ),
                }
            }
        }

        tracing::debug!(root = %root.display(), count = packages.len(), "loaded installation");
        Ok(Self::from_packages(root, packages))
    }

    pub fn from_packages(root: &Path, mut packages: Vec<PackageModel>) -> Self {
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            root: root.to_path_buf(),
            packages,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn packages(&self) -> &[PackageModel] {
        &self.packages
    }

    pub fn find(&self, name: &str) -> Option<&PackageModel> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Where an installed file lives on disk.
    pub fn file_location(&self, file: &PackageFile) -> PathBuf {
        self.root.join(&file.relative_destination_path)
    }
}
