use crate::config::Config;
use crate::core::PackResult;
use crate::module::sidecar::sidecar_path;
use crate::module::ModuleIndex;
use crate::package::copy::copy_with_retry;
use crate::package::installation::Installation;
use crate::package::manifest::MacroTable;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// State shared by the actions of one pipeline run.
///
/// Owns the scratch directory transformed files are written to; it is
/// removed when the context is dropped, whether the run succeeded or not.
pub struct BuildContext<'a> {
    temp_dir: TempDir,
    pub project_dir: PathBuf,
    pub installation: &'a Installation,
    pub index: &'a mut dyn ModuleIndex,
    pub config: &'a Config,
    /// Module names the resolver must never resolve
    pub excluded: BTreeSet<String>,
    /// Macros for manifests read during the run
    pub macros: MacroTable,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        project_dir: &Path,
        installation: &'a Installation,
        index: &'a mut dyn ModuleIndex,
        config: &'a Config,
    ) -> PackResult<Self> {
        let temp_dir = tempfile::Builder::new().prefix("plugpack-").tempdir()?;
        tracing::debug!(path = %temp_dir.path().display(), "created build directory");
        Ok(Self {
            temp_dir,
            project_dir: project_dir.to_path_buf(),
            installation,
            index,
            config,
            excluded: BTreeSet::new(),
            macros: MacroTable::new(),
        })
    }

    pub fn with_excluded<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.excluded.extend(names);
        self
    }

    pub fn with_macros(mut self, macros: MacroTable) -> Self {
        self.macros = macros;
        self
    }

    /// Root of the scratch directory.
    pub fn work_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Scratch location for the output of `step` on the file at `destination`.
    pub fn scratch_path(&self, step: &str, destination: &str) -> PathBuf {
        destination
            .split('/')
            .fold(self.work_dir().join(step), |path, segment| path.join(segment))
    }

    /// Copy the module metadata of `from`, if any, next to `to`.
    pub fn carry_sidecar(&self, from: &Path, to: &Path) -> PackResult<()> {
        let sidecar = sidecar_path(from);
        if sidecar.exists() {
            copy_with_retry(
                &sidecar,
                &sidecar_path(to),
                self.config.copy_retries,
                self.config.copy_backoff(),
            )?;
        }
        Ok(())
    }
}
