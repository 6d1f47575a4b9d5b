//! End-to-end package creation: manifest in, archives out.

use crate::config::Config;
use crate::core::version::validate_prerelease;
use crate::core::PackResult;
use crate::module::{ModuleIndex, SidecarModuleIndex};
use crate::package::archive::PackageArchiver;
use crate::package::installation::Installation;
use crate::package::manifest::{expand_manifest, load_manifest, MacroTable, GIT_VERSION_MACRO};
use crate::package::model::PackageModel;
use crate::pipeline::{ActionPipeline, ActionRegistry, BuildContext};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Inputs of a `create` run.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub manifest: PathBuf,
    /// Directory manifest file paths are relative to (defaults to the manifest's directory)
    pub project_dir: Option<PathBuf>,
    pub install_dir: PathBuf,
    pub obfuscator: Option<String>,
    /// Archive paths to write (defaults to `<name>.<version>.plugpack`)
    pub outputs: Vec<PathBuf>,
    pub prerelease: Option<String>,
    /// Value of the `GitVersion` macro
    pub package_version: Option<String>,
    /// Module names never resolved
    pub excluded: Vec<String>,
}

impl CreateOptions {
    pub fn new(manifest: &Path, install_dir: &Path) -> Self {
        Self {
            manifest: manifest.to_path_buf(),
            install_dir: install_dir.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn project_dir(&self) -> PathBuf {
        match &self.project_dir {
            Some(dir) => dir.clone(),
            None => self
                .manifest
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    pub fn macros(&self) -> MacroTable {
        let macros = MacroTable::from_env();
        match &self.package_version {
            Some(version) => macros.define(GIT_VERSION_MACRO, version),
            None => macros,
        }
    }
}

/// A finished build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub package: PackageModel,
    pub outputs: Vec<PathBuf>,
}

pub struct PackageBuilder<'a> {
    config: &'a Config,
}

impl<'a> PackageBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// The manifest with macros expanded, as YAML. Nothing else is run.
    pub fn expand(&self, options: &CreateOptions) -> PackResult<String> {
        let value = expand_manifest(&options.manifest, &options.macros())?;
        Ok(serde_yaml::to_string(&value)?)
    }

    /// Load the manifest and apply the pre-release tag.
    pub fn load(&self, options: &CreateOptions) -> PackResult<PackageModel> {
        if let Some(tag) = &options.prerelease {
            validate_prerelease(tag)?;
        }

        let mut pkg = load_manifest(&options.manifest, &options.project_dir(), &options.macros())?;
        if let Some(tag) = &options.prerelease {
            pkg.version = pkg.version.with_prerelease(tag)?;
        }
        Ok(pkg)
    }

    /// Build the package and write every output archive.
    pub fn build(&self, options: &CreateOptions) -> PackResult<BuildOutcome> {
        let mut pkg = self.load(options)?;
        let project_dir = options.project_dir();

        let installation = Installation::load(&options.install_dir)?;
        let mut index = SidecarModuleIndex::new();
        index.search(&options.install_dir)?;
        if !project_dir.starts_with(&options.install_dir) {
            index.search(&project_dir)?;
        }

        let registry = ActionRegistry::with_defaults(self.config, options.obfuscator.as_deref())?;
        let mut ctx = BuildContext::new(&project_dir, &installation, &mut index, self.config)?
            .with_excluded(options.excluded.iter().cloned())
            .with_macros(options.macros());

        ActionPipeline::new(registry).run(&mut pkg, &mut ctx)?;
        pkg.ensure_directives_consumed()?;
        pkg.validate()?;
        pkg.date = Some(Utc::now());

        let outputs = if options.outputs.is_empty() {
            vec![PathBuf::from(PackageArchiver::default_file_name(&pkg))]
        } else {
            options.outputs.clone()
        };

        // Transformed files live in the build directory, so write before it is dropped
        let mut written = Vec::new();
        for output in &outputs {
            written.push(PackageArchiver::write(&pkg, output)?);
        }
        drop(ctx);

        Ok(BuildOutcome {
            package: pkg,
            outputs: written,
        })
    }
}
