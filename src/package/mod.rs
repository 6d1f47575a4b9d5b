pub mod archive;
pub mod checksum;
pub mod copy;
pub mod directive;
pub mod installation;
pub mod manifest;
pub mod model;
pub mod verifier;

pub use archive::PackageArchiver;
pub use checksum::{hash_file, ChecksumAlgorithm};
pub use copy::copy_with_retry;
pub use directive::{DirectiveKind, FileDirective};
pub use installation::Installation;
pub use manifest::{load_manifest, MacroTable};
pub use model::{PackageDependency, PackageFile, PackageModel};
pub use verifier::{PackageVerifier, VerificationResult};
