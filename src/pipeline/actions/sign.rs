use crate::config::ToolConfig;
use crate::core::PackResult;
use crate::package::directive::{DirectiveKind, FileDirective};
use crate::package::model::PackageModel;
use crate::pipeline::tool::{run_tool, ToolArgs};
use crate::pipeline::{ActionStage, BuildContext, PackageAction};

/// Signs files marked `sign` with their certificate.
pub struct SignAction {
    tool: ToolConfig,
}

impl SignAction {
    pub fn new(tool: ToolConfig) -> Self {
        Self { tool }
    }
}

impl PackageAction for SignAction {
    fn name(&self) -> &str {
        "sign"
    }

    fn stage(&self) -> ActionStage {
        ActionStage::Create
    }

    fn order(&self) -> i32 {
        1000
    }

    fn execute(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool> {
        let mut changed = false;
        for file in &mut pkg.files {
            let Some(FileDirective::Sign { certificate }) = file.take_directive(DirectiveKind::Sign)
            else {
                continue;
            };
            let output = ctx.scratch_path("signed", &file.relative_destination_path);
            run_tool(
                self.name(),
                &self.tool,
                ToolArgs::new(&file.source_path, &output).with_certificate(&certificate),
            )?;
            ctx.carry_sidecar(&file.source_path, &output)?;

            tracing::info!(file = %file.relative_destination_path, certificate = %certificate, "signed");
            file.source_path = output;
            changed = true;
        }
        Ok(changed)
    }
}
