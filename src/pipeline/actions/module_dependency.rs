use crate::core::PackResult;
use crate::module::sidecar::is_module_file;
use crate::package::model::PackageModel;
use crate::pipeline::{ActionStage, BuildContext, PackageAction};
use crate::resolver::DependencyResolver;

/// Discovers the modules each file references and resolves them into
/// package dependencies or bundled payload.
///
/// Runs after every action that rewrites module contents, since those can
/// change what a module references.
pub struct ModuleDependencyAction;

impl PackageAction for ModuleDependencyAction {
    fn name(&self) -> &str {
        "module-dependency"
    }

    fn stage(&self) -> ActionStage {
        ActionStage::Create
    }

    fn order(&self) -> i32 {
        999
    }

    fn execute(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool> {
        for file in &mut pkg.files {
            if !is_module_file(&file.source_path) {
                continue;
            }
            ctx.index.search(&file.source_path)?;
            if let Some(module) = ctx.index.find_at(&file.source_path) {
                file.dependent_modules
                    .extend(module.references.iter().cloned());
            }
        }

        let payload_root = ctx.work_dir().to_path_buf();
        let mut resolver = DependencyResolver::from_config(ctx.config, &payload_root);
        let report = resolver.resolve(pkg, ctx.installation, &mut *ctx.index, &ctx.excluded)?;

        tracing::info!(
            package = %pkg.name,
            dependencies = report.added_dependencies.len(),
            bundled = report.bundled_files.len(),
            unresolved = report.unresolved.len(),
            passes = report.passes,
            "resolved module dependencies"
        );
        Ok(!report.is_unchanged())
    }
}
