use crate::classifier::Classifier;
use crate::config::{ReclassifyPolicy, Settings};
use crate::error::Error;
use crate::linker::{clean_tree, CleanReport, LinkOutcome, Reconciler};
use crate::model::Entry;
use crate::progress::PassReporter;
use crate::scanner;
use crate::storage::Ledger;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Per-outcome counts for the links attempted in one pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LinkTally {
    pub created: usize,
    pub replaced: usize,
    pub already_linked: usize,
    pub rejected: usize,
    pub foreign: usize,
    pub planned: usize,
    pub failed: usize,
}

impl LinkTally {
    pub fn record(&mut self, outcome: LinkOutcome) {
        match outcome {
            LinkOutcome::Created => self.created += 1,
            LinkOutcome::Replaced => self.replaced += 1,
            LinkOutcome::AlreadyLinked => self.already_linked += 1,
            LinkOutcome::Rejected => self.rejected += 1,
            LinkOutcome::ForeignObject => self.foreign += 1,
            LinkOutcome::Planned => self.planned += 1,
            LinkOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created
            + self.replaced
            + self.already_linked
            + self.rejected
            + self.foreign
            + self.planned
            + self.failed
    }
}

/// Summary of one pass.
///
/// In dry-run mode cleanup is only simulated, so the link stage still sees
/// links that cleanup would have removed. Under the full policy a link that
/// already points at its source is counted as already linked, not planned.
#[derive(Debug, Default, Clone)]
pub struct PassReport {
    pub listed: usize,
    pub unprocessed: usize,
    /// Nothing new was found, so the classifier was not called.
    pub skipped: bool,
    pub categorizations: usize,
    pub clean: Option<CleanReport>,
    pub links: LinkTally,
    pub marked: usize,
    pub mark_failures: usize,
    pub duration: Duration,
}

/// Drives one reconciliation pass: list, filter, classify, clean, apply,
/// record. Holds no state between passes beyond its injected collaborators.
pub struct ReconcileEngine {
    settings: Settings,
    ledger: Box<dyn Ledger>,
    classifier: Box<dyn Classifier>,
}

impl ReconcileEngine {
    pub fn new(settings: Settings, ledger: Box<dyn Ledger>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            settings,
            ledger,
            classifier,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    pub fn run_pass(&self, reporter: &dyn PassReporter) -> Result<PassReport, Error> {
        let start = Instant::now();
        let settings = &self.settings;
        info!("Starting file organization pass...");
        reporter.on_pass_start();

        let entries = scanner::list_root_entries(&settings.source_root, &settings.ignore_patterns)?;
        let unprocessed: Vec<Entry> = entries
            .iter()
            .filter(|entry| !self.is_processed(entry))
            .cloned()
            .collect();
        reporter.on_list_complete(entries.len(), unprocessed.len());

        let mut report = PassReport {
            listed: entries.len(),
            unprocessed: unprocessed.len(),
            ..Default::default()
        };

        if unprocessed.is_empty() {
            info!("No new items to process.");
            report.skipped = true;
            report.duration = start.elapsed();
            reporter.on_pass_complete(&report);
            return Ok(report);
        }

        info!("Found {} new items to process.", unprocessed.len());
        if settings.run_mode.is_dry_run() {
            debug!("New items: {:?}", unprocessed);
        }

        let batch: &[Entry] = match settings.policy {
            ReclassifyPolicy::Full => &entries,
            ReclassifyPolicy::Incremental => &unprocessed,
        };

        reporter.on_classify_start(batch.len());
        let categorizations = self.classifier.classify(batch)?;
        reporter.on_classify_complete(categorizations.len());
        report.categorizations = categorizations.len();

        if settings.policy == ReclassifyPolicy::Full {
            if settings.run_mode.is_dry_run() {
                info!("Dry run: cleanup is simulated, existing links are reported as kept");
            }
            let clean = clean_tree(&settings.target_root, settings.run_mode);
            reporter.on_clean_complete(&clean);
            report.clean = Some(clean);
        }

        let reconciler = Reconciler::new(
            &settings.target_root,
            &settings.allowed_roots,
            settings.run_mode,
        );
        let targets_total: usize = categorizations.iter().map(|c| c.targets.len()).sum();
        for categorization in &categorizations {
            for target in &categorization.targets {
                let outcome =
                    reconciler.link_entry(&settings.source_root, &categorization.source, target);
                report.links.record(outcome);
                reporter.on_apply_progress(report.links.total(), targets_total);
            }
        }

        // Every classified entry is recorded, including ones the classifier
        // skipped, so they are not retried forever.
        if settings.run_mode.is_dry_run() {
            info!("Dry run: ledger left unchanged for {} items", batch.len());
        } else {
            for entry in batch {
                match self.ledger.mark_processed(&entry.name) {
                    Ok(()) => report.marked += 1,
                    Err(e) => {
                        error!("Error marking {} as processed: {}", entry.name, e);
                        report.mark_failures += 1;
                    }
                }
            }
        }

        report.duration = start.elapsed();
        info!(
            "File organization complete: {} created, {} replaced, {} unchanged, {} skipped, {} failed",
            report.links.created,
            report.links.replaced,
            report.links.already_linked,
            report.links.rejected + report.links.foreign,
            report.links.failed
        );
        reporter.on_pass_complete(&report);
        Ok(report)
    }

    fn is_processed(&self, entry: &Entry) -> bool {
        match self.ledger.is_processed(&entry.name) {
            Ok(processed) => processed,
            Err(e) => {
                warn!(
                    "Error checking ledger for {}, treating as new: {}",
                    entry.name, e
                );
                false
            }
        }
    }
}
