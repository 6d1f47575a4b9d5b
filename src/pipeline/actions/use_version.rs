use super::indexed_module;
use crate::core::{PackError, PackResult};
use crate::package::directive::DirectiveKind;
use crate::package::model::PackageModel;
use crate::pipeline::{ActionStage, BuildContext, PackageAction};

/// Takes the package version from the module version of the file marked
/// `use_version`. A pre-release tag already on the package is kept.
pub struct UseVersionAction;

impl PackageAction for UseVersionAction {
    fn name(&self) -> &str {
        "use-version"
    }

    fn stage(&self) -> ActionStage {
        ActionStage::Prepare
    }

    fn order(&self) -> i32 {
        0
    }

    fn execute(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool> {
        let marked: Vec<usize> = pkg
            .files
            .iter()
            .enumerate()
            .filter(|(_, f)| f.has_directive(DirectiveKind::UseVersion))
            .map(|(i, _)| i)
            .collect();

        let position = match marked.as_slice() {
            [] => return Ok(false),
            [position] => *position,
            _ => {
                return Err(PackError::Package(format!(
                    "Only one file may carry 'use_version', found {}",
                    marked.len()
                )))
            }
        };

        let file = &mut pkg.files[position];
        file.take_directive(DirectiveKind::UseVersion);
        let module = indexed_module(ctx, file)?;

        let mut version = module.version.clone();
        version.build_metadata = None;
        if let Some(prerelease) = &pkg.version.prerelease {
            version = version.with_prerelease(prerelease)?;
        }

        tracing::info!(
            package = %pkg.name,
            version = %version,
            module = %module.name,
            "using module version as package version"
        );
        pkg.version = version;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{write_module, Fixture};
    use super::*;
    use crate::core::version::SemanticVersion;
    use crate::package::directive::FileDirective;
    use crate::package::model::PackageFile;
    use tempfile::TempDir;

    #[test]
    fn test_version_from_module() {
        let temp = TempDir::new().unwrap();
        let module = write_module(temp.path(), "Plugin.dll", "name: Plugin\nversion: 2.3.4\n");
        let mut fixture = Fixture::new(temp.path());
        let mut ctx = BuildContext::new(
            temp.path(),
            &fixture.installation,
            &mut fixture.index,
            &fixture.config,
        )
        .unwrap();

        let mut pkg = PackageModel::new("Plugin", SemanticVersion::parse("0.0.0-beta").unwrap());
        pkg.files
            .push(PackageFile::new(module, "Plugin.dll").with_directive(FileDirective::UseVersion));

        assert!(UseVersionAction.execute(&mut pkg, &mut ctx).unwrap());
        assert_eq!(pkg.version.to_string(), "2.3.4-beta");
        assert!(pkg.files[0].directives.is_empty());
    }

    #[test]
    fn test_more_than_one_marked_file() {
        let temp = TempDir::new().unwrap();
        let a = write_module(temp.path(), "A.dll", "name: A\nversion: 1.0.0\n");
        let b = write_module(temp.path(), "B.dll", "name: B\nversion: 1.0.0\n");
        let mut fixture = Fixture::new(temp.path());
        let mut ctx = BuildContext::new(
            temp.path(),
            &fixture.installation,
            &mut fixture.index,
            &fixture.config,
        )
        .unwrap();

        let mut pkg = PackageModel::new("Plugin", SemanticVersion::new(0, 0, 0));
        pkg.files
            .push(PackageFile::new(a, "A.dll").with_directive(FileDirective::UseVersion));
        pkg.files
            .push(PackageFile::new(b, "B.dll").with_directive(FileDirective::UseVersion));

        assert!(matches!(
            UseVersionAction.execute(&mut pkg, &mut ctx),
            Err(PackError::Package(_))
        ));
    }
}
