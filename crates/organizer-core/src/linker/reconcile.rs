use super::target::TargetPath;
use super::RunMode;
use crate::model::{Entry, EntryKind};
use crate::platform;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Result of reconciling one target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkOutcome {
    Created,
    /// A symlink pointing elsewhere was removed and recreated.
    Replaced,
    AlreadyLinked,
    /// Target was not admissible; nothing was touched.
    Rejected,
    /// A regular file or directory occupies the path (or one of its parents).
    ForeignObject,
    /// Dry run: the link would have been created or replaced.
    Planned,
    Failed,
}

/// Creates and repairs symlinks under the target root.
pub struct Reconciler<'a> {
    target_root: &'a Path,
    allowed_roots: &'a [String],
    mode: RunMode,
}

impl<'a> Reconciler<'a> {
    pub fn new(target_root: &'a Path, allowed_roots: &'a [String], mode: RunMode) -> Self {
        Self {
            target_root,
            allowed_roots,
            mode,
        }
    }

    /// Link `entry` (living in `source_root`) at the location named by the
    /// classifier's raw target string.
    pub fn link_entry(&self, source_root: &Path, entry: &Entry, raw_target: &str) -> LinkOutcome {
        match TargetPath::resolve(raw_target, entry, self.allowed_roots) {
            Ok(target) => self.ensure_link(&source_root.join(&entry.name), &target, entry.kind),
            Err(rejection) => {
                info!(
                    "Skipping target '{}' for {}: {}",
                    raw_target, entry.name, rejection
                );
                LinkOutcome::Rejected
            }
        }
    }

    /// Make the path named by `target` a symlink to `source_path`.
    ///
    /// Absent: create. Correct link: no-op. Link elsewhere: replace.
    /// Anything that is not a symlink: leave alone.
    pub fn ensure_link(&self, source_path: &Path, target: &TargetPath, kind: EntryKind) -> LinkOutcome {
        let link_path = target.under(self.target_root);

        if let Err(blocker) = self.check_parents(target) {
            warn!(
                "Cannot create symlink {}: {} is not a directory",
                link_path.display(),
                blocker.display()
            );
            return LinkOutcome::ForeignObject;
        }

        let mut stale = false;
        match fs::symlink_metadata(&link_path) {
            Ok(metadata) if metadata.file_type().is_symlink() => match fs::read_link(&link_path) {
                Ok(current) if current == source_path => {
                    debug!("Already linked: {}", link_path.display());
                    return LinkOutcome::AlreadyLinked;
                }
                Ok(current) => {
                    debug!(
                        "{} points to {}, expected {}",
                        link_path.display(),
                        current.display(),
                        source_path.display()
                    );
                    stale = true;
                }
                Err(e) => {
                    error!("Error reading symlink {}: {}", link_path.display(), e);
                    return LinkOutcome::Failed;
                }
            },
            Ok(_) => {
                warn!(
                    "Cannot create symlink: {} already exists and is not a symlink",
                    link_path.display()
                );
                return LinkOutcome::ForeignObject;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                error!("Error inspecting {}: {}", link_path.display(), e);
                return LinkOutcome::Failed;
            }
        }

        if self.mode.is_dry_run() {
            info!(
                "Dry run: would {} symlink {} -> {}",
                if stale { "replace" } else { "create" },
                link_path.display(),
                source_path.display()
            );
            return LinkOutcome::Planned;
        }

        if stale {
            if let Err(e) = platform::remove_symlink(&link_path) {
                error!("Error removing stale symlink {}: {}", link_path.display(), e);
                return LinkOutcome::Failed;
            }
        }

        if let Some(parent) = link_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Error creating directory {}: {}", parent.display(), e);
                return LinkOutcome::Failed;
            }
        }

        match platform::create_symlink(source_path, &link_path, kind) {
            Ok(()) => {
                info!(
                    "Created symlink: {} -> {}",
                    link_path.display(),
                    source_path.display()
                );
                if stale {
                    LinkOutcome::Replaced
                } else {
                    LinkOutcome::Created
                }
            }
            Err(e) => {
                error!("Error creating symlink {}: {}", link_path.display(), e);
                LinkOutcome::Failed
            }
        }
    }

    /// Every existing ancestor between the target root and the link must be a
    /// real directory, so a link never lands inside a linked source folder.
    fn check_parents(&self, target: &TargetPath) -> Result<(), PathBuf> {
        let segments = target.segments();
        let mut current = self.target_root.to_path_buf();
        for segment in &segments[..segments.len() - 1] {
            current.push(segment);
            match fs::symlink_metadata(&current) {
                Ok(metadata) if metadata.file_type().is_dir() => {}
                Ok(_) => return Err(current),
                Err(_) => return Ok(()),
            }
        }
        Ok(())
    }
}
