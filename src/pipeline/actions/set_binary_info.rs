use super::indexed_module;
use crate::core::PackResult;
use crate::module::sidecar::{sidecar_path, ModuleMetadata};
use crate::package::copy::copy_with_retry;
use crate::package::directive::DirectiveKind;
use crate::package::model::PackageModel;
use crate::pipeline::{ActionStage, BuildContext, PackageAction};

/// Stamps the package version into the metadata of modules marked
/// `set_binary_info`, working on a copy in the scratch directory.
pub struct SetBinaryInfoAction;

impl PackageAction for SetBinaryInfoAction {
    fn name(&self) -> &str {
        "set-binary-info"
    }

    fn stage(&self) -> ActionStage {
        ActionStage::Create
    }

    fn order(&self) -> i32 {
        20
    }

    fn execute(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool> {
        let mut changed = false;
        for file in &mut pkg.files {
            if file.take_directive(DirectiveKind::SetBinaryInfo).is_none() {
                continue;
            }
            let module = indexed_module(ctx, file)?;
            let stamped = ctx.scratch_path("stamped", &file.relative_destination_path);
            copy_with_retry(
                &file.source_path,
                &stamped,
                ctx.config.copy_retries,
                ctx.config.copy_backoff(),
            )?;

            let metadata = ModuleMetadata {
                name: module.name,
                version: pkg.version.clone(),
                references: module.references,
            };
            metadata.save(&sidecar_path(&stamped))?;

            tracing::debug!(file = %file.relative_destination_path, version = %pkg.version, "stamped module version");
            file.source_path = stamped;
            changed = true;
        }
        Ok(changed)
    }
}
