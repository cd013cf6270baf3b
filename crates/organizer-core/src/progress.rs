use crate::engine::PassReport;
use crate::linker::CleanReport;

/// Trait for reporting reconciliation pass progress.
///
/// CLI implements with indicatif; scheduled runs and tests stay silent.
/// All methods have default no-op implementations.
pub trait PassReporter: Send + Sync {
    fn on_pass_start(&self) {}
    fn on_list_complete(&self, _listed: usize, _unprocessed: usize) {}
    fn on_classify_start(&self, _items: usize) {}
    fn on_classify_complete(&self, _categorizations: usize) {}
    fn on_clean_complete(&self, _report: &CleanReport) {}
    fn on_apply_progress(&self, _targets_done: usize, _targets_total: usize) {}
    fn on_pass_complete(&self, _report: &PassReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl PassReporter for SilentReporter {}
