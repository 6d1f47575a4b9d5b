use crate::core::PackResult;
use crate::package::checksum::{hash_file, ChecksumAlgorithm};
use crate::package::directive::FileDirective;
use crate::package::installation::Installation;
use crate::package::model::{PackageFile, PackageModel};
use std::fmt;
use std::path::Path;

/// Outcome of checking one installed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileVerification {
    Ok,
    /// The file is listed in the manifest but absent on disk.
    Missing,
    ChecksumMismatch { expected: String, actual: String },
    /// No usable checksum was recorded; inconclusive, not a failure.
    MissingChecksum,
}

impl FileVerification {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FileVerification::Missing | FileVerification::ChecksumMismatch { .. }
        )
    }
}

impl fmt::Display for FileVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileVerification::Ok => write!(f, "ok"),
            FileVerification::Missing => write!(f, "missing"),
            FileVerification::ChecksumMismatch { expected, actual } => write!(
                f,
                "non-matching checksum (expected {}, actual {})",
                expected, actual
            ),
            FileVerification::MissingChecksum => write!(f, "missing checksum metadata"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub package: String,
    pub file: String,
    pub outcome: FileVerification,
}

/// Verifies installed files against the checksums recorded at build time
pub struct PackageVerifier<'a> {
    installation: &'a Installation,
}

impl<'a> PackageVerifier<'a> {
    pub fn new(installation: &'a Installation) -> Self {
        Self { installation }
    }

    /// Verify every installed package
    pub fn verify_all(&self) -> PackResult<VerificationResult> {
        let mut result = VerificationResult::new();
        for package in self.installation.packages() {
            result.extend(self.verify_package(package)?);
        }
        Ok(result)
    }

    /// Verify every file of one installed package
    pub fn verify_package(&self, package: &PackageModel) -> PackResult<VerificationResult> {
        let mut result = VerificationResult::new();

        for file in &package.files {
            let location = self.installation.file_location(file);
            let outcome = verify_file(&location, file)?;
            if outcome.is_failure() {
                tracing::warn!(
                    package = %package.name,
                    file = %file.relative_destination_path,
                    outcome = %outcome,
                    "verification failed"
                );
            }
            result.add(FileReport {
                package: package.name.clone(),
                file: file.relative_destination_path.clone(),
                outcome,
            });
        }

        Ok(result)
    }
}

/// Check the file at `location` against the hash recorded on `file`.
pub fn verify_file(location: &Path, file: &PackageFile) -> PackResult<FileVerification> {
    if !location.is_file() {
        return Ok(FileVerification::Missing);
    }

    let recorded = file.directives.iter().find_map(|d| match d {
        FileDirective::Hash { algorithm, value } => Some((algorithm, value)),
        _ => None,
    });
    let Some((algorithm, expected)) = recorded else {
        return Ok(FileVerification::MissingChecksum);
    };
    let Ok(algorithm) = ChecksumAlgorithm::parse(algorithm) else {
        tracing::debug!(algorithm = %algorithm, "unknown checksum algorithm");
        return Ok(FileVerification::MissingChecksum);
    };

    let actual = hash_file(location, algorithm)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(FileVerification::Ok)
    } else {
        Ok(FileVerification::ChecksumMismatch {
            expected: expected.clone(),
            actual,
        })
    }
}

/// Result of verification operation
#[derive(Debug, Clone, Default)]
pub struct VerificationResult {
    pub reports: Vec<FileReport>,
}

impl VerificationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, report: FileReport) {
        self.reports.push(report);
    }

    pub fn extend(&mut self, other: VerificationResult) {
        self.reports.extend(other.reports);
    }

    pub fn is_success(&self) -> bool {
        !self.reports.iter().any(|r| r.outcome.is_failure())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn inconclusive(&self) -> impl Iterator<Item = &FileReport> {
        self.reports
            .iter()
            .filter(|r| r.outcome == FileVerification::MissingChecksum)
    }

    pub fn passed(&self) -> impl Iterator<Item = &FileReport> {
        self.reports
            .iter()
            .filter(|r| r.outcome == FileVerification::Ok)
    }

    pub fn total_verified(&self) -> usize {
        self.reports.len()
    }
}
