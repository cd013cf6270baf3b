mod ledger;
pub mod sqlite;

pub use ledger::{Ledger, MemoryLedger};
pub use sqlite::SqliteLedger;
