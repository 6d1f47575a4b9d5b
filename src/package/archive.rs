use crate::core::path::{ensure_dir, package_manifest_path};
use crate::core::{PackError, PackResult};
use crate::package::model::PackageModel;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File extension of package archives.
pub const PACKAGE_EXTENSION: &str = "plugpack";

/// Writes a package's files and manifest into a zip container
pub struct PackageArchiver;

impl PackageArchiver {
    /// Default archive file name: `<name>.<version>.plugpack`
    pub fn default_file_name(pkg: &PackageModel) -> String {
        format!("{}.{}.{}", pkg.name, pkg.version, PACKAGE_EXTENSION)
    }

    /// Write `pkg` to `output`.
    ///
    /// Each file is stored at its destination; the manifest is stored at
    /// `Packages/<name>/package.yaml`.
    pub fn write(pkg: &PackageModel, output: &Path) -> PackResult<PathBuf> {
        let manifest_entry = package_manifest_path(&pkg.name);
        if pkg.file_by_destination(&manifest_entry).is_some() {
            return Err(PackError::Package(format!(
                "'{}' is reserved for the package manifest",
                manifest_entry
            )));
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }

        let mut zip = ZipWriter::new(File::create(output)?);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for file in &pkg.files {
            let mut source = File::open(&file.source_path).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!(
                        "cannot read '{}' for '{}': {}",
                        file.source_path.display(),
                        file.relative_destination_path,
                        e
                    ),
                )
            })?;
            zip.start_file(file.relative_destination_path.as_str(), options)?;
            io::copy(&mut source, &mut zip)?;
        }

        let manifest = serde_yaml::to_string(&pkg.to_installed_manifest())?;
        zip.start_file(manifest_entry, options)?;
        zip.write_all(manifest.as_bytes())?;
        zip.finish()?;

        tracing::info!(
            package = %pkg.name,
            version = %pkg.version,
            files = pkg.files.len(),
            output = %output.display(),
            "wrote package archive"
        );
        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::SemanticVersion;
    use crate::package::model::PackageFile;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn test_default_file_name() {
        let pkg = PackageModel::new("Plugin", SemanticVersion::parse("1.2.0-rc.1").unwrap());
        assert_eq!(
            PackageArchiver::default_file_name(&pkg),
            "Plugin.1.2.0-rc.1.plugpack"
        );
    }

    #[test]
    fn test_write_archive() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.dll");
        fs::write(&source, b"module").unwrap();

        let mut pkg = PackageModel::new("Plugin", SemanticVersion::new(1, 0, 0));
        pkg.files
            .push(PackageFile::new(source, "Packages/Plugin/a.dll"));

        let output = temp.path().join("out/Plugin.plugpack");
        PackageArchiver::write(&pkg, &output).unwrap();

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = Vec::new();
        archive
            .by_name("Packages/Plugin/a.dll")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"module");

        let mut manifest = String::new();
        archive
            .by_name("Packages/Plugin/package.yaml")
            .unwrap()
            .read_to_string(&mut manifest)
            .unwrap();
        let embedded: PackageModel = serde_yaml::from_str(&manifest).unwrap();
        assert_eq!(embedded.name, "Plugin");
        assert_eq!(
            embedded.files[0].source_path,
            PathBuf::from("Packages/Plugin/a.dll")
        );
    }

    #[test]
    fn test_write_missing_source() {
        let temp = TempDir::new().unwrap();
        let mut pkg = PackageModel::new("Plugin", SemanticVersion::new(1, 0, 0));
        pkg.files.push(PackageFile::new(
            temp.path().join("missing.dll"),
            "missing.dll",
        ));

        let result = PackageArchiver::write(&pkg, &temp.path().join("p.plugpack"));
        assert!(matches!(result, Err(PackError::Io(_))));
    }

    #[test]
    fn test_write_rejects_reserved_manifest_path() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("package.yaml");
        fs::write(&source, "x").unwrap();
        let mut pkg = PackageModel::new("Plugin", SemanticVersion::new(1, 0, 0));
        pkg.files
            .push(PackageFile::new(source, "Packages/Plugin/package.yaml"));

        let result = PackageArchiver::write(&pkg, &temp.path().join("p.plugpack"));
        assert!(result.is_err());
    }
}
