pub mod dependency_resolver;
pub mod offered;

pub use dependency_resolver::{DependencyResolver, ResolutionReport};
pub use offered::{OfferedModule, OfferedModules};
