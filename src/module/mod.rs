//! Discovery of binary modules and the modules they reference.

pub mod memory;
pub mod record;
pub mod sidecar;

pub use memory::MemoryModuleIndex;
pub use record::{ModuleRecord, ModuleReference};
pub use sidecar::SidecarModuleIndex;

use crate::core::PackResult;
use std::path::Path;

/// Maps search roots to the modules found under them.
///
/// Searching is incremental: every root searched is remembered, and
/// searching a location again replaces what was known about it (files can be
/// rewritten by pipeline actions between searches).
pub trait ModuleIndex {
    /// Search `root` (a file or a directory) and return the modules found there.
    fn search(&mut self, root: &Path) -> PackResult<Vec<ModuleRecord>>;

    /// Every module found by any search so far.
    fn modules(&self) -> &[ModuleRecord];

    /// Record a module whose metadata is already known, such as a copy of
    /// an indexed module. Replaces any record at the same location.
    fn register(&mut self, record: ModuleRecord);

    /// The module located at exactly `location`, if one has been found.
    fn find_at(&self, location: &Path) -> Option<&ModuleRecord> {
        self.modules().iter().find(|m| m.location == location)
    }
}

/// Insert or replace the record at `record.location`.
pub(crate) fn upsert(records: &mut Vec<ModuleRecord>, record: ModuleRecord) {
    match records.iter_mut().find(|r| r.location == record.location) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}
