use crate::core::PackResult;
use crate::package::checksum::{hash_file, ChecksumAlgorithm};
use crate::package::directive::FileDirective;
use crate::package::model::PackageModel;
use crate::pipeline::{ActionStage, BuildContext, PackageAction};
use rayon::prelude::*;

/// Records a checksum of every file's final contents.
///
/// Runs last so the checksums cover signed bytes.
pub struct HashAction;

impl PackageAction for HashAction {
    fn name(&self) -> &str {
        "hash"
    }

    fn stage(&self) -> ActionStage {
        ActionStage::Create
    }

    fn order(&self) -> i32 {
        1001
    }

    fn execute(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool> {
        let algorithm = ChecksumAlgorithm::parse(&ctx.config.checksum_algorithm)?;

        let digests: Vec<PackResult<String>> = pkg
            .files
            .par_iter()
            .map(|file| hash_file(&file.source_path, algorithm))
            .collect();

        for (file, digest) in pkg.files.iter_mut().zip(digests) {
            file.set_directive(FileDirective::Hash {
                algorithm: algorithm.as_str().to_string(),
                value: digest?,
            });
        }
        Ok(!pkg.files.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;
    use crate::core::version::SemanticVersion;
    use crate::package::model::PackageFile;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_records_hash_per_file() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "abc").unwrap();
        fs::write(&b, "abc").unwrap();

        let mut fixture = Fixture::new(temp.path());
        fixture.config.checksum_algorithm = "sha256".to_string();
        let mut ctx = BuildContext::new(
            temp.path(),
            &fixture.installation,
            &mut fixture.index,
            &fixture.config,
        )
        .unwrap();

        let mut pkg = PackageModel::new("Plugin", SemanticVersion::new(1, 0, 0));
        pkg.files.push(PackageFile::new(a, "a.txt"));
        pkg.files.push(PackageFile::new(b, "b.txt"));

        assert!(HashAction.execute(&mut pkg, &mut ctx).unwrap());
        // Re-hashing replaces rather than duplicates the marker
        HashAction.execute(&mut pkg, &mut ctx).unwrap();

        for file in &pkg.files {
            assert_eq!(
                file.directives,
                vec![FileDirective::Hash {
                    algorithm: "sha256".to_string(),
                    value: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
                        .to_string(),
                }]
            );
        }
    }

    #[test]
    fn test_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let mut fixture = Fixture::new(temp.path());
        let mut ctx = BuildContext::new(
            temp.path(),
            &fixture.installation,
            &mut fixture.index,
            &fixture.config,
        )
        .unwrap();

        let mut pkg = PackageModel::new("Plugin", SemanticVersion::new(1, 0, 0));
        pkg.files
            .push(PackageFile::new(temp.path().join("gone.dll"), "gone.dll"));
        assert!(HashAction.execute(&mut pkg, &mut ctx).is_err());
    }
}
