//! Ordered execution of file-transform actions over a package.
//!
//! Actions are registered explicitly in an [`ActionRegistry`] and run in
//! ascending `(stage, order)`; actions with equal keys keep their
//! registration order. Most actions consume a [`FileDirective`] from the files
//! they transform; a directive nothing consumed is rejected after the run.
//!
//! [`FileDirective`]: crate::package::directive::FileDirective

pub mod actions;
pub mod context;
pub mod tool;

pub use context::BuildContext;

use crate::config::Config;
use crate::core::{PackError, PackResult};
use crate::package::model::PackageModel;
use actions::{
    HashAction, InheritDependenciesAction, ModuleDependencyAction, ObfuscateAction,
    SetBinaryInfoAction, SignAction, UseVersionAction,
};
use std::fmt;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionStage {
    /// Settles package metadata before any file is transformed
    Prepare,
    /// Transforms files and resolves dependencies
    Create,
}

impl fmt::Display for ActionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStage::Prepare => write!(f, "prepare"),
            ActionStage::Create => write!(f, "create"),
        }
    }
}

/// A step of the build pipeline.
pub trait PackageAction {
    fn name(&self) -> &str;

    fn stage(&self) -> ActionStage;

    /// Position within the stage; lower runs first.
    fn order(&self) -> i32;

    /// Apply the action to `pkg`. Returns whether anything changed.
    fn execute(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool>;
}

/// The actions a pipeline runs.
#[derive(Default)]
pub struct ActionRegistry {
    actions: Vec<Box<dyn PackageAction>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default action set.
    ///
    /// One obfuscation action is registered per configured obfuscator; only
    /// the one named by `obfuscator` is active.
    pub fn with_defaults(config: &Config, obfuscator: Option<&str>) -> PackResult<Self> {
        if let Some(name) = obfuscator {
            if !config.obfuscators.contains_key(name) {
                let known: Vec<&str> = config.obfuscators.keys().map(String::as_str).collect();
                return Err(PackError::Config(format!(
                    "Unknown obfuscator '{}'. Available: {}",
                    name,
                    known.join(", ")
                )));
            }
        }

        let mut registry = Self::new()
            .with(UseVersionAction)
            .with(InheritDependenciesAction);
        for (name, tool) in &config.obfuscators {
            registry.register(Box::new(ObfuscateAction::new(
                name,
                tool.clone(),
                obfuscator == Some(name.as_str()),
            )));
        }
        Ok(registry
            .with(SetBinaryInfoAction)
            .with(ModuleDependencyAction)
            .with(SignAction::new(config.sign_tool.clone()))
            .with(HashAction))
    }

    pub fn register(&mut self, action: Box<dyn PackageAction>) {
        self.actions.push(action);
    }

    pub fn with<A: PackageAction + 'static>(mut self, action: A) -> Self {
        self.register(Box::new(action));
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions in execution order.
    pub fn ordered(&self) -> Vec<&dyn PackageAction> {
        let mut ordered: Vec<&dyn PackageAction> = self.actions.iter().map(|a| &**a).collect();
        ordered.sort_by_key(|a| (a.stage(), a.order()));
        ordered
    }
}

/// Runs every registered action against a package.
pub struct ActionPipeline {
    registry: ActionRegistry,
}

impl ActionPipeline {
    pub fn new(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    /// Execute all actions in `(stage, order)` order.
    ///
    /// Stops at the first failing action. Returns whether any action changed
    /// the package.
    pub fn run(&self, pkg: &mut PackageModel, ctx: &mut BuildContext<'_>) -> PackResult<bool> {
        let mut changed = false;
        for action in self.registry.ordered() {
            tracing::debug!(
                action = action.name(),
                stage = %action.stage(),
                order = action.order(),
                "running action"
            );
            if action.execute(pkg, ctx)? {
                tracing::debug!(action = action.name(), "action changed package");
                changed = true;
            }
        }
        Ok(changed)
    }
}
