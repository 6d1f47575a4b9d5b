//! The default pipeline actions.

mod hash;
mod inherit_dependencies;
mod module_dependency;
mod obfuscate;
mod set_binary_info;
mod sign;
mod use_version;

pub use hash::HashAction;
pub use inherit_dependencies::InheritDependenciesAction;
pub use module_dependency::ModuleDependencyAction;
pub use obfuscate::ObfuscateAction;
pub use set_binary_info::SetBinaryInfoAction;
pub use sign::SignAction;
pub use use_version::UseVersionAction;

use super::BuildContext;
use crate::core::{PackError, PackResult};
use crate::module::ModuleRecord;
use crate::package::model::PackageFile;

/// Index the file's current source and return its module record.
fn indexed_module(ctx: &mut BuildContext<'_>, file: &PackageFile) -> PackResult<ModuleRecord> {
    ctx.index.search(&file.source_path)?;
    ctx.index
        .find_at(&file.source_path)
        .cloned()
        .ok_or_else(|| {
            PackError::Package(format!(
                "'{}' is not a module ({})",
                file.relative_destination_path,
                file.source_path.display()
            ))
        })
}
