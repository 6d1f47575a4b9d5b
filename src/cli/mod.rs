pub mod create;
pub mod verify;

use plugpack::config::Config;
use plugpack::core::{PackError, PackResult};
use std::env;
use std::path::PathBuf;

/// `--install-dir`, else the configured directory, relative to the current directory.
pub(crate) fn install_dir(explicit: Option<PathBuf>, config: &Config) -> PackResult<PathBuf> {
    let current_dir = env::current_dir()
        .map_err(|e| PackError::Path(format!("Failed to get current directory: {}", e)))?;
    Ok(match explicit {
        Some(dir) => current_dir.join(dir),
        None => config.get_install_dir(&current_dir),
    })
}
