use super::RunMode;
use crate::platform;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Counts from one cleanup walk. In dry-run mode the counts are what would
/// have been removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    pub links_removed: usize,
    pub dirs_removed: usize,
    pub failures: usize,
}

impl CleanReport {
    fn merge(self, other: CleanReport) -> CleanReport {
        CleanReport {
            links_removed: self.links_removed + other.links_removed,
            dirs_removed: self.dirs_removed + other.dirs_removed,
            failures: self.failures + other.failures,
        }
    }
}

/// The two deletions cleanup performs. Only consulted in apply mode.
pub trait Remover: Sync {
    fn remove_link(&self, path: &Path) -> io::Result<()>;
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

/// Deletes from the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove_link(&self, path: &Path) -> io::Result<()> {
        platform::remove_symlink(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// Remove every symlink under `root`, then every directory left empty,
/// bottom-up, including `root` itself. Regular files are never touched and
/// keep their directories alive. Failures are logged and counted.
pub fn clean_tree(root: &Path, mode: RunMode) -> CleanReport {
    clean_tree_with(root, mode, &FsRemover)
}

/// [`clean_tree`] with deletions routed through `remover`. A failed deletion
/// keeps its parent alive and the walk carries on with the siblings.
pub fn clean_tree_with(root: &Path, mode: RunMode, remover: &dyn Remover) -> CleanReport {
    let (empty, mut report) = prune_dir(root, mode, remover);
    if empty {
        remove_empty_dir(root, mode, remover, &mut report);
    }
    info!(
        "Cleanup of {}: {} symlinks, {} empty directories removed, {} failures",
        root.display(),
        report.links_removed,
        report.dirs_removed,
        report.failures
    );
    report
}

/// Post-order walk. Returns whether `dir` has no remaining children once its
/// symlinks and empty subdirectories are gone.
fn prune_dir(dir: &Path, mode: RunMode, remover: &dyn Remover) -> (bool, CleanReport) {
    let mut report = CleanReport::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return (false, report),
        Err(err) => {
            error!("Error reading directory {}: {}", dir.display(), err);
            report.failures += 1;
            return (false, report);
        }
    };

    let mut remaining = 0usize;
    let mut subdirs: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                error!("Error reading entry in directory {}: {}", dir.display(), err);
                report.failures += 1;
                remaining += 1;
                continue;
            }
        };

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                error!("Error getting file type for {}: {}", path.display(), err);
                report.failures += 1;
                remaining += 1;
                continue;
            }
        };

        if file_type.is_symlink() {
            if !remove_link(&path, mode, remover, &mut report) {
                remaining += 1;
            }
        } else if file_type.is_dir() {
            subdirs.push(path);
        } else {
            remaining += 1;
        }
    }

    let (kept, sub_report) = subdirs
        .par_iter()
        .map(|subdir| {
            let (empty, mut sub_report) = prune_dir(subdir, mode, remover);
            let removed = empty && remove_empty_dir(subdir, mode, remover, &mut sub_report);
            (usize::from(!removed), sub_report)
        })
        .reduce(
            || (0, CleanReport::default()),
            |a, b| (a.0 + b.0, a.1.merge(b.1)),
        );

    remaining += kept;
    (remaining == 0, report.merge(sub_report))
}

fn remove_link(path: &Path, mode: RunMode, remover: &dyn Remover, report: &mut CleanReport) -> bool {
    if mode.is_dry_run() {
        info!("Dry run: would remove symlink {}", path.display());
        report.links_removed += 1;
        return true;
    }
    match remover.remove_link(path) {
        Ok(()) => {
            debug!("Removed symlink {}", path.display());
            report.links_removed += 1;
            true
        }
        Err(err) => {
            error!("Error removing symlink {}: {}", path.display(), err);
            report.failures += 1;
            false
        }
    }
}

fn remove_empty_dir(
    path: &Path,
    mode: RunMode,
    remover: &dyn Remover,
    report: &mut CleanReport,
) -> bool {
    if mode.is_dry_run() {
        info!("Dry run: would remove empty directory {}", path.display());
        report.dirs_removed += 1;
        return true;
    }
    match remover.remove_dir(path) {
        Ok(()) => {
            debug!("Removed empty directory {}", path.display());
            report.dirs_removed += 1;
            true
        }
        Err(err) => {
            error!("Error removing directory {}: {}", path.display(), err);
            report.failures += 1;
            false
        }
    }
}
