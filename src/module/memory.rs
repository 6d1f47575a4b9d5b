use super::{upsert, ModuleIndex, ModuleRecord};
use crate::core::PackResult;
use std::path::Path;

/// Module index over records registered up front.
///
/// `search` never touches the disk: it returns the registered records that
/// live under the root. Useful when module metadata comes from somewhere
/// other than the file system, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryModuleIndex {
    records: Vec<ModuleRecord>,
}

impl MemoryModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modules(records: Vec<ModuleRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    pub fn insert(&mut self, record: ModuleRecord) {
        upsert(&mut self.records, record);
    }
}

impl ModuleIndex for MemoryModuleIndex {
    fn search(&mut self, root: &Path) -> PackResult<Vec<ModuleRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.location.starts_with(root))
            .cloned()
            .collect())
    }

    fn modules(&self) -> &[ModuleRecord] {
        &self.records
    }

    fn register(&mut self, record: ModuleRecord) {
        self.insert(record);
    }
}
