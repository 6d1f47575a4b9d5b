use crate::core::error::{PackError, PackResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A semantic version: `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
///
/// Legacy four-component versions (`1.2.3.4`) are accepted; the fourth
/// component becomes the leading build-metadata identifier (`1.2.3+4`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release version (e.g., "alpha.1", "beta.2", "rc.1")
    pub prerelease: Option<String>,
    /// Build metadata (e.g., "build.123")
    pub build_metadata: Option<String>,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build_metadata: None,
        }
    }

    /// Return a copy of this version carrying the given pre-release tag.
    ///
    /// Fails with [`PackError::InvalidPrerelease`] when the tag is not a
    /// valid SemVer pre-release.
    pub fn with_prerelease(&self, prerelease: &str) -> PackResult<Self> {
        validate_prerelease(prerelease)?;
        Ok(Self {
            prerelease: Some(prerelease.to_string()),
            ..self.clone()
        })
    }

    /// Parse a version string (e.g., "1.2.3", "1.2", "1.2.3-rc.1+build.456", "1.2.3.4")
    pub fn parse(s: &str) -> PackResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PackError::Version("Empty version string".to_string()));
        }

        let (version_prerelease, build_metadata) = match s.split_once('+') {
            Some((head, build)) => (head, Some(build.to_string())),
            None => (s, None),
        };

        // Pre-release identifiers may themselves contain '-', so split on the first one.
        let (numbers, prerelease) = match version_prerelease.split_once('-') {
            Some((head, pre)) => (head, Some(pre.to_string())),
            None => (version_prerelease, None),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() > 4 {
            return Err(PackError::Version(format!(
                "Invalid version format: {}",
                s
            )));
        }

        let mut numeric = Vec::with_capacity(parts.len());
        for part in &parts {
            let value: u64 = part
                .parse()
                .map_err(|_| PackError::Version(format!("Invalid version format: {}", s)))?;
            numeric.push(value);
        }

        // Legacy revision component: 1.2.3.4 -> 1.2.3+4
        let build_metadata = match (numeric.get(3), build_metadata) {
            (Some(revision), Some(build)) => Some(format!("{}.{}", revision, build)),
            (Some(revision), None) => Some(revision.to_string()),
            (None, build) => build,
        };

        if let Some(ref pre) = prerelease {
            validate_prerelease(pre)
                .map_err(|_| PackError::Version(format!("Invalid pre-release in: {}", s)))?;
        }
        if let Some(ref build) = build_metadata {
            if !build.split('.').all(is_identifier) {
                return Err(PackError::Version(format!(
                    "Invalid build metadata in: {}",
                    s
                )));
            }
        }

        Ok(Self {
            major: numeric[0],
            minor: numeric.get(1).copied().unwrap_or(0),
            patch: numeric.get(2).copied().unwrap_or(0),
            prerelease,
            build_metadata,
        })
    }

    /// Compare only `(major, minor, patch)`.
    pub fn cmp_release(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }

    /// `major.minor.patch` without pre-release or build metadata.
    pub fn release_string(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Binary-level compatibility check used when matching a found module
/// against a reference: same major, and at least the referenced minor.
pub fn is_compatible(searched: &SemanticVersion, referenced: &SemanticVersion) -> bool {
    searched.major == referenced.major && searched.minor >= referenced.minor
}

/// Validate a SemVer pre-release tag (dot-separated, non-empty
/// `[0-9A-Za-z-]` identifiers, no leading zeros on numeric identifiers).
pub fn validate_prerelease(tag: &str) -> PackResult<()> {
    let valid = tag.split('.').all(|ident| {
        is_identifier(ident)
            && !(ident.len() > 1
                && ident.starts_with('0')
                && ident.chars().all(|c| c.is_ascii_digit()))
    });

    if valid {
        Ok(())
    } else {
        Err(PackError::InvalidPrerelease(tag.to_string()))
    }
}

fn is_identifier(ident: &str) -> bool {
    !ident.is_empty() && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

// Build metadata does not take part in equality or precedence
impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major
            && self.minor == other.minor
            && self.patch == other.patch
            && self.prerelease == other.prerelease
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.cmp_release(other) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_prerelease_identifiers(a, b),
            },
            other => other,
        }
    }
}

/// Compare pre-release identifiers per SemVer precedence rules
fn compare_prerelease_identifiers(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<&str> = a.split('.').collect();
    let b_parts: Vec<&str> = b.split('.').collect();

    for (a_part, b_part) in a_parts.iter().zip(b_parts.iter()) {
        let ordering = match (a_part.parse::<u64>(), b_part.parse::<u64>()) {
            (Ok(a_num), Ok(b_num)) => a_num.cmp(&b_num),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a_part.cmp(b_part),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a_parts.len().cmp(&b_parts.len())
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(ref build) = self.build_metadata {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = PackError;

    fn try_from(value: String) -> PackResult<Self> {
        Self::parse(&value)
    }
}

impl From<SemanticVersion> for String {
    fn from(value: SemanticVersion) -> Self {
        value.to_string()
    }
}

/// Package-level version predicate used for dependency specifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionSpecifier {
    /// Matches every version: "any", "*" or ""
    Any,
    /// Caret range: "^1.2.3" or "1.2.3" (>=1.2.3 <2.0.0)
    Compatible(SemanticVersion),
    /// Exact release: "=1.2.3"
    Exact(SemanticVersion),
}

impl VersionSpecifier {
    /// Specifier accepting anything compatible with `version`.
    pub fn compatible(version: &SemanticVersion) -> Self {
        VersionSpecifier::Compatible(version.clone())
    }

    pub fn parse(s: &str) -> PackResult<Self> {
        let s = s.trim();

        if s.is_empty() || s == "*" || s.eq_ignore_ascii_case("any") {
            Ok(VersionSpecifier::Any)
        } else if let Some(rest) = s.strip_prefix('^') {
            Ok(VersionSpecifier::Compatible(SemanticVersion::parse(rest)?))
        } else if let Some(rest) = s.strip_prefix('=') {
            Ok(VersionSpecifier::Exact(SemanticVersion::parse(rest)?))
        } else {
            Ok(VersionSpecifier::Compatible(SemanticVersion::parse(s)?))
        }
    }

    pub fn is_compatible(&self, version: &SemanticVersion) -> bool {
        match self {
            VersionSpecifier::Any => true,
            VersionSpecifier::Compatible(v) => {
                version.major == v.major && version.minor >= v.minor
            }
            VersionSpecifier::Exact(v) => version.cmp_release(v) == Ordering::Equal,
        }
    }

    /// The narrowest specifier accepting only versions both accept, if any
    /// version can satisfy both.
    pub fn intersect(&self, other: &VersionSpecifier) -> Option<VersionSpecifier> {
        use VersionSpecifier::*;

        match (self, other) {
            (Any, s) | (s, Any) => Some(s.clone()),
            (Compatible(a), Compatible(b)) => {
                if a.major != b.major {
                    None
                } else if a.cmp_release(b) == Ordering::Less {
                    Some(Compatible(b.clone()))
                } else {
                    Some(Compatible(a.clone()))
                }
            }
            (Exact(e), c @ Compatible(_)) | (c @ Compatible(_), Exact(e)) => {
                c.is_compatible(e).then(|| Exact(e.clone()))
            }
            (Exact(a), Exact(b)) => (a.cmp_release(b) == Ordering::Equal).then(|| Exact(a.clone())),
        }
    }
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpecifier::Any => write!(f, "any"),
            VersionSpecifier::Compatible(v) => write!(f, "^{}", v),
            VersionSpecifier::Exact(v) => write!(f, "={}", v),
        }
    }
}

impl TryFrom<String> for VersionSpecifier {
    type Error = PackError;

    fn try_from(value: String) -> PackResult<Self> {
        Self::parse(&value)
    }
}

impl From<VersionSpecifier> for String {
    fn from(value: VersionSpecifier) -> Self {
        value.to_string()
    }
}
