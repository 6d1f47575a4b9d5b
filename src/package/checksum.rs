//! File content hashing shared by the hash action and verification.

use crate::core::{PackError, PackResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Checksum algorithm for package files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumAlgorithm {
    Sha256,
    #[default]
    Blake3,
}

impl ChecksumAlgorithm {
    pub fn parse(s: &str) -> PackResult<Self> {
        match s.to_lowercase().as_str() {
            "blake3" => Ok(ChecksumAlgorithm::Blake3),
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            _ => Err(PackError::Config(format!(
                "Invalid checksum algorithm '{}'. Must be 'blake3' or 'sha256'",
                s
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Blake3 => "blake3",
        }
    }
}

/// Hex digest of the file at `path`.
pub fn hash_file(path: &Path, algorithm: ChecksumAlgorithm) -> PackResult<String> {
    let mut reader = BufReader::new(File::open(path)?);

    match algorithm {
        ChecksumAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            io::copy(&mut reader, &mut hasher)?;
            Ok(hex::encode(hasher.finalize()))
        }
        ChecksumAlgorithm::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            io::copy(&mut reader, &mut hasher)?;
            Ok(hasher.finalize().to_hex().to_string())
        }
    }
}
