//! Module-driven dependency resolution.
//!
//! Each file of the package declares the modules it references. The resolver
//! repeatedly computes the references nothing offers yet and satisfies them,
//! preferring an installed package that offers them (added as a package
//! dependency) and falling back to copying a matching module from the index
//! into the package as bundled payload. It stops when nothing is missing or a
//! pass makes no progress.

use crate::config::Config;
use crate::core::path::DEPENDENCIES_DIR;
use crate::core::version::{is_compatible, SemanticVersion, VersionSpecifier};
use crate::core::{PackError, PackResult};
use crate::module::sidecar::sidecar_path;
use crate::module::{ModuleIndex, ModuleRecord};
use crate::package::copy::copy_with_retry;
use crate::package::installation::Installation;
use crate::package::model::{PackageDependency, PackageFile, PackageModel};
use crate::resolver::offered::{OfferedModule, OfferedModules};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Modules every runtime provides; never resolved.
pub const DEFAULT_BASE_MODULES: &[&str] = &["netstandard", "mscorlib"];

/// A file's need for a module at a version.
#[derive(Debug, Clone, PartialEq)]
struct Requirement {
    file: String,
    version: SemanticVersion,
}

/// Missing module names and every reference requiring them.
type MissingModules = BTreeMap<String, Vec<Requirement>>;

/// What a resolution run changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    /// Package dependencies added or given a specifier
    pub added_dependencies: Vec<PackageDependency>,
    /// Destinations of module files bundled as payload
    pub bundled_files: Vec<String>,
    /// Module names no package or module could satisfy
    pub unresolved: Vec<String>,
    /// Number of passes over the missing set
    pub passes: usize,
}

impl ResolutionReport {
    pub fn is_unchanged(&self) -> bool {
        self.added_dependencies.is_empty() && self.bundled_files.is_empty()
    }
}

/// Resolves module references into package dependencies and bundled payload.
pub struct DependencyResolver {
    base_modules: BTreeSet<String>,
    payload_root: PathBuf,
    copy_attempts: u32,
    copy_backoff: Duration,
    offered: OfferedModules,
    unresolved: BTreeSet<String>,
}

impl DependencyResolver {
    /// Create a resolver copying bundled payload under `payload_root`.
    pub fn new(payload_root: &Path) -> Self {
        Self {
            base_modules: DEFAULT_BASE_MODULES.iter().map(|s| s.to_string()).collect(),
            payload_root: payload_root.to_path_buf(),
            copy_attempts: 10,
            copy_backoff: Duration::from_millis(100),
            offered: OfferedModules::new(),
            unresolved: BTreeSet::new(),
        }
    }

    /// Create a resolver with base modules and copy settings from `config`.
    pub fn from_config(config: &Config, payload_root: &Path) -> Self {
        Self::new(payload_root)
            .with_base_modules(config.base_modules.iter().cloned())
            .with_copy_retry(config.copy_retries, config.copy_backoff())
    }

    pub fn with_base_modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.base_modules = modules.into_iter().collect();
        self
    }

    pub fn with_copy_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.copy_attempts = attempts;
        self.copy_backoff = backoff;
        self
    }

    /// Names found unsatisfiable so far. They are never retried by this resolver.
    pub fn unresolved(&self) -> &BTreeSet<String> {
        &self.unresolved
    }

    /// Resolve the module references of `pkg` in place.
    ///
    /// `index` must already know the modules of the installation and of every
    /// file of `pkg` (at their source paths). References whose name is in
    /// `excluded` are ignored.
    pub fn resolve(
        &mut self,
        pkg: &mut PackageModel,
        installed: &Installation,
        index: &mut dyn ModuleIndex,
        excluded: &BTreeSet<String>,
    ) -> PackResult<ResolutionReport> {
        let mut report = ResolutionReport::default();
        // The package's file list may have changed since a previous run
        self.offered.invalidate(&pkg.name, &pkg.version.to_string());

        self.validate_dependencies(pkg, installed, &mut report)?;

        loop {
            report.passes += 1;
            let missing = self.missing_modules(pkg, installed, &*index, excluded)?;
            if missing.is_empty() {
                break;
            }
            tracing::debug!(
                package = %pkg.name,
                pass = report.passes,
                missing = ?missing.keys().collect::<Vec<_>>(),
                "resolving missing modules"
            );

            let found_new = match self.best_candidate(pkg, installed, &*index, &missing) {
                Some(candidate) => {
                    self.commit_candidate(pkg, candidate, installed, &*index, &missing, &mut report)?
                }
                None => {
                    self.check_installed_conflicts(pkg, installed, &*index, &missing)?;
                    self.bundle_payload(pkg, index, &missing, &mut report)?
                }
            };

            if !found_new {
                break;
            }
        }

        Ok(report)
    }

    /// Give unversioned dependencies the installed version and check the rest.
    fn validate_dependencies(
        &self,
        pkg: &mut PackageModel,
        installed: &Installation,
        report: &mut ResolutionReport,
    ) -> PackResult<()> {
        for dependency in &mut pkg.dependencies {
            let package = installed.find(&dependency.name).ok_or_else(|| {
                PackError::DependencyNotInstalled {
                    name: dependency.name.clone(),
                }
            })?;

            if let Some(specifier) = &dependency.version {
                if !specifier.is_compatible(&package.version) {
                    return Err(PackError::IncompatibleDependency {
                        name: dependency.name.clone(),
                        specifier: specifier.to_string(),
                        installed: package.version.to_string(),
                    });
                }
                continue;
            }

            let specifier = VersionSpecifier::compatible(&package.version);
            tracing::info!(
                dependency = %dependency.name,
                version = %specifier,
                "using installed version for dependency"
            );
            dependency.version = Some(specifier);
            report.added_dependencies.push(dependency.clone());
        }
        Ok(())
    }

    fn installed_offers(
        &mut self,
        package: &PackageModel,
        installed: &Installation,
        index: &dyn ModuleIndex,
    ) -> Vec<OfferedModule> {
        self.offered
            .get(package, index, |f| installed.file_location(f))
            .to_vec()
    }

    /// References not satisfied by the package itself or its dependencies.
    fn missing_modules(
        &mut self,
        pkg: &PackageModel,
        installed: &Installation,
        index: &dyn ModuleIndex,
        excluded: &BTreeSet<String>,
    ) -> PackResult<MissingModules> {
        let mut offered: Vec<OfferedModule> = self
            .offered
            .get(pkg, index, |f| f.source_path.clone())
            .to_vec();
        let mut committed = Vec::new();
        for dependency in &pkg.dependencies {
            if let Some(package) = installed.find(&dependency.name) {
                let modules = self.installed_offers(package, installed, index);
                offered.extend(modules.iter().cloned());
                committed.push((package, modules));
            }
        }

        let mut missing = MissingModules::new();
        for file in &pkg.files {
            for reference in &file.dependent_modules {
                if self.base_modules.contains(&reference.name)
                    || file.ignored_modules.contains(&reference.name)
                    || excluded.contains(&reference.name)
                    || self.unresolved.contains(&reference.name)
                {
                    continue;
                }

                let satisfied = offered.iter().any(|m| {
                    m.record.name == reference.name
                        && is_compatible(&m.record.version, &reference.version)
                });
                if satisfied {
                    continue;
                }

                // A committed dependency that ships this module at the wrong version
                for (package, modules) in &committed {
                    if let Some(module) = modules
                        .iter()
                        .find(|m| !m.bundled && m.record.name == reference.name)
                    {
                        return Err(version_conflict(
                            &file.relative_destination_path,
                            &reference.name,
                            &reference.version,
                            package,
                            &module.record.version,
                        ));
                    }
                }

                missing
                    .entry(reference.name.clone())
                    .or_default()
                    .push(Requirement {
                        file: file.relative_destination_path.clone(),
                        version: reference.version.clone(),
                    });
            }
        }
        Ok(missing)
    }

    /// The installed package satisfying the most missing names.
    ///
    /// A name counts when the package ships a module of that name compatible
    /// with every reference requiring it. Packages are visited in name order;
    /// the first with the highest score wins.
    fn best_candidate<'a>(
        &mut self,
        pkg: &PackageModel,
        installed: &'a Installation,
        index: &dyn ModuleIndex,
        missing: &MissingModules,
    ) -> Option<&'a PackageModel> {
        let mut best: Option<(&PackageModel, usize)> = None;

        for package in installed.packages() {
            if package.name == pkg.name || pkg.has_dependency(&package.name) {
                continue;
            }
            let modules = self.installed_offers(package, installed, index);
            let score = missing
                .iter()
                .filter(|(name, requirements)| satisfying_module(&modules, name, requirements).is_some())
                .count();

            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((package, score));
            }
        }

        best.map(|(package, _)| package)
    }

    /// Add `candidate` as a package dependency.
    fn commit_candidate(
        &mut self,
        pkg: &mut PackageModel,
        candidate: &PackageModel,
        installed: &Installation,
        index: &dyn ModuleIndex,
        missing: &MissingModules,
        report: &mut ResolutionReport,
    ) -> PackResult<bool> {
        let modules = self.installed_offers(candidate, installed, index);
        let satisfied: Vec<&str> = missing
            .iter()
            .filter(|(name, requirements)| satisfying_module(&modules, name, requirements).is_some())
            .map(|(name, _)| name.as_str())
            .collect();

        let dependency = PackageDependency::new(
            &candidate.name,
            Some(VersionSpecifier::compatible(&candidate.version)),
        );
        tracing::info!(
            package = %pkg.name,
            dependency = %candidate.name,
            version = %candidate.version,
            modules = ?satisfied,
            "added package dependency"
        );
        let changed = pkg.add_dependency(dependency.clone())?;
        if changed {
            report.added_dependencies.push(dependency);
        }
        Ok(changed)
    }

    /// Fail when an installed package ships a missing module only at an
    /// incompatible version.
    ///
    /// Only called once no installed package satisfies any missing name.
    fn check_installed_conflicts(
        &mut self,
        pkg: &PackageModel,
        installed: &Installation,
        index: &dyn ModuleIndex,
        missing: &MissingModules,
    ) -> PackResult<()> {
        for package in installed.packages() {
            if package.name == pkg.name || pkg.has_dependency(&package.name) {
                continue;
            }
            let modules = self.installed_offers(package, installed, index);

            for (name, requirements) in missing {
                let Some(offered) = modules
                    .iter()
                    .filter(|m| !m.bundled && &m.record.name == name)
                    .map(|m| &m.record.version)
                    .max()
                else {
                    continue;
                };

                if let Some(requirement) = requirements
                    .iter()
                    .find(|r| !is_compatible(offered, &r.version))
                {
                    return Err(version_conflict(
                        &requirement.file,
                        name,
                        &requirement.version,
                        package,
                        offered,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Copy a compatible module from the index into the package for each missing name.
    fn bundle_payload(
        &mut self,
        pkg: &mut PackageModel,
        index: &mut dyn ModuleIndex,
        missing: &MissingModules,
        report: &mut ResolutionReport,
    ) -> PackResult<bool> {
        let mut found_new = false;

        for (name, requirements) in missing {
            let Some(module) = best_module(&*index, name, requirements).cloned() else {
                let files: BTreeSet<&str> =
                    requirements.iter().map(|r| r.file.as_str()).collect();
                tracing::warn!(
                    module = %name,
                    files = ?files,
                    "no installed package or module satisfies reference; building without it"
                );
                self.unresolved.insert(name.clone());
                report.unresolved.push(name.clone());
                continue;
            };

            let file = self.copy_payload(&module, index)?;
            if pkg.file_by_destination(&file.relative_destination_path).is_some() {
                self.unresolved.insert(name.clone());
                report.unresolved.push(name.clone());
                continue;
            }

            tracing::info!(
                package = %pkg.name,
                module = %module.name,
                version = %module.version,
                destination = %file.relative_destination_path,
                "bundled module as payload"
            );
            report.bundled_files.push(file.relative_destination_path.clone());
            pkg.files.push(file);
            found_new = true;
        }

        if found_new {
            self.offered
                .invalidate(&pkg.name, &pkg.version.to_string());
        }
        Ok(found_new)
    }

    /// Copy `module` (and its metadata) into the payload area and index the copy.
    fn copy_payload(
        &self,
        module: &ModuleRecord,
        index: &mut dyn ModuleIndex,
    ) -> PackResult<PackageFile> {
        let file_name = module
            .location
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PackError::Path(format!("Invalid module path: {}", module.location.display()))
            })?;
        let folder = format!("{}.{}", module.name, module.version.release_string());
        let target = self
            .payload_root
            .join(DEPENDENCIES_DIR)
            .join(&folder)
            .join(file_name);

        copy_with_retry(&module.location, &target, self.copy_attempts, self.copy_backoff)?;
        let sidecar = sidecar_path(&module.location);
        if sidecar.exists() {
            copy_with_retry(&sidecar, &sidecar_path(&target), self.copy_attempts, self.copy_backoff)?;
        }
        index.register(ModuleRecord {
            location: target.clone(),
            ..module.clone()
        });

        let destination = format!("{}/{}/{}", DEPENDENCIES_DIR, folder, file_name);
        let mut file = PackageFile::new(target, &destination);
        file.dependent_modules = module.references.iter().cloned().collect();
        Ok(file)
    }
}

/// A non-bundled module named `name` compatible with every requirement.
fn satisfying_module<'a>(
    modules: &'a [OfferedModule],
    name: &str,
    requirements: &[Requirement],
) -> Option<&'a OfferedModule> {
    modules.iter().find(|m| {
        !m.bundled
            && m.record.name == name
            && requirements
                .iter()
                .all(|r| is_compatible(&m.record.version, &r.version))
    })
}

/// Highest-versioned module named `name` compatible with every requirement.
fn best_module<'a>(
    index: &'a dyn ModuleIndex,
    name: &str,
    requirements: &[Requirement],
) -> Option<&'a ModuleRecord> {
    index
        .modules()
        .iter()
        .filter(|m| m.name == name)
        .filter(|m| {
            requirements
                .iter()
                .all(|r| is_compatible(&m.version, &r.version))
        })
        .max_by(|a, b| a.version.cmp_release(&b.version))
}

fn version_conflict(
    file: &str,
    module: &str,
    required: &SemanticVersion,
    package: &PackageModel,
    offered: &SemanticVersion,
) -> PackError {
    PackError::VersionConflict {
        file: file.to_string(),
        module: module.to_string(),
        required: required.to_string(),
        package: format!("{} {}", package.name, package.version),
        offered: offered.to_string(),
    }
}
