use crate::error::Error;
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Durable set of source entry names that have already been handled.
///
/// Marking is an upsert: marking a name twice leaves a single record.
pub trait Ledger: Send + Sync {
    fn is_processed(&self, name: &str) -> Result<bool, Error>;
    fn mark_processed(&self, name: &str) -> Result<(), Error>;
    fn count(&self) -> Result<usize, Error>;
    /// All recorded names, sorted.
    fn processed_names(&self) -> Result<Vec<String>, Error>;
    fn clear(&self) -> Result<(), Error>;
}

/// In-process ledger for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    names: Mutex<BTreeSet<String>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeSet<String>>, Error> {
        self.names
            .lock()
            .map_err(|e| Error::Other(format!("Failed to lock ledger: {}", e)))
    }
}

impl Ledger for MemoryLedger {
    fn is_processed(&self, name: &str) -> Result<bool, Error> {
        Ok(self.lock()?.contains(name))
    }

    fn mark_processed(&self, name: &str) -> Result<(), Error> {
        self.lock()?.insert(name.to_string());
        Ok(())
    }

    fn count(&self) -> Result<usize, Error> {
        Ok(self.lock()?.len())
    }

    fn processed_names(&self) -> Result<Vec<String>, Error> {
        Ok(self.lock()?.iter().cloned().collect())
    }

    fn clear(&self) -> Result<(), Error> {
        self.lock()?.clear();
        Ok(())
    }
}
