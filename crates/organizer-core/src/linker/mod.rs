pub mod cleaner;
pub mod reconcile;
pub mod target;

pub use cleaner::{clean_tree, clean_tree_with, CleanReport, FsRemover, Remover};
pub use reconcile::{LinkOutcome, Reconciler};
pub use target::{Rejection, TargetPath};

/// Whether mutating filesystem operations are performed or only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    DryRun,
    Apply,
}

impl RunMode {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, RunMode::DryRun)
    }
}
