pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod linker;
pub mod model;
pub mod platform;
pub mod progress;
pub mod scanner;
pub mod scheduler;
pub mod storage;

pub use config::{AppConfig, ReclassifyPolicy, Settings};
pub use engine::{PassReport, ReconcileEngine};
pub use error::Error;
pub use linker::RunMode;
pub use model::{Categorization, Entry, EntryKind};
pub use progress::{PassReporter, SilentReporter};
pub use scheduler::{RunScheduler, TriggerOutcome};
pub use storage::{Ledger, MemoryLedger, SqliteLedger};
