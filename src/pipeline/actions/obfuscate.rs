use crate::config::ToolConfig;
use crate::core::PackResult;
use crate::package::directive::DirectiveKind;
use crate::package::model::PackageModel;
use crate::pipeline::tool::{run_tool, ToolArgs};
use crate::pipeline::{ActionStage, BuildContext, PackageAction};

/// Runs an obfuscator over files marked `obfuscate`.
///
/// One instance is registered per configured obfuscator. Inactive instances
/// leave the directives alone, so with no obfuscator selected they remain
/// unconsumed and the build is rejected.
pub struct ObfuscateAction {
    name: String,
    tool: ToolConfig,
    active: bool,
}

impl ObfuscateAction {
    pub fn new(name: &str, tool: ToolConfig, active: bool) -> Self {
        Self {
            name: name.to_string(),
            tool,
            active,
        }
    }
}

impl PackageAction for ObfuscateAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn stage(&self) -> ActionStage {
        ActionStage::Create
    }

    fn order(&self) -> i32 {
        10
    }

    fn execute(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool> {
        if !self.active {
            return Ok(false);
        }

        let mut changed = false;
        for file in &mut pkg.files {
            if file.take_directive(DirectiveKind::Obfuscate).is_none() {
                continue;
            }
            let output = ctx.scratch_path("obfuscated", &file.relative_destination_path);
            run_tool(&self.name, &self.tool, ToolArgs::new(&file.source_path, &output))?;
            ctx.carry_sidecar(&file.source_path, &output)?;

            tracing::info!(file = %file.relative_destination_path, obfuscator = %self.name, "obfuscated");
            file.source_path = output;
            changed = true;
        }
        Ok(changed)
    }
}
