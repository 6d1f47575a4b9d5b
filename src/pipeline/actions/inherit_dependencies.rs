use crate::core::PackResult;
use crate::package::directive::DirectiveKind;
use crate::package::manifest::load_manifest;
use crate::package::model::PackageModel;
use crate::pipeline::{ActionStage, BuildContext, PackageAction};

/// Merges the dependencies of another package manifest into this package.
///
/// The file marked `inherit_dependencies` is a package manifest, expanded with
/// the build's macros; the file itself stays in the package.
pub struct InheritDependenciesAction;

impl PackageAction for InheritDependenciesAction {
    fn name(&self) -> &str {
        "inherit-dependencies"
    }

    fn stage(&self) -> ActionStage {
        ActionStage::Create
    }

    fn order(&self) -> i32 {
        10
    }

    fn execute(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool> {
        let mut inherited = Vec::new();
        for file in &mut pkg.files {
            if file.take_directive(DirectiveKind::InheritDependencies).is_none() {
                continue;
            }
            let manifest = load_manifest(&file.source_path, &ctx.project_dir, &ctx.macros)?;
            tracing::debug!(
                from = %manifest.name,
                count = manifest.dependencies.len(),
                "inheriting dependencies"
            );
            inherited.extend(manifest.dependencies);
        }

        let mut changed = false;
        for dependency in inherited {
            if dependency.name == pkg.name {
                continue;
            }
            changed |= pkg.add_dependency(dependency)?;
        }
        Ok(changed)
    }
}
