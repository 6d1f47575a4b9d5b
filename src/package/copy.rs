use crate::core::path::ensure_dir;
use crate::core::PackResult;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Copy `from` to `to`, creating parent directories.
///
/// External tools may still hold the source open, so a failed copy is
/// attempted up to `attempts` times with a fixed `backoff` between tries.
/// The error from the last attempt is returned.
pub fn copy_with_retry(from: &Path, to: &Path, attempts: u32, backoff: Duration) -> PackResult<u64> {
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }

    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match fs::copy(from, to) {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempt < attempts => {
                tracing::debug!(
                    from = %from.display(),
                    to = %to.display(),
                    attempt,
                    error = %e,
                    "copy failed, retrying"
                );
                attempt += 1;
                thread::sleep(backoff);
            }
            Err(e) => return Err(e.into()),
        }
    }
}
