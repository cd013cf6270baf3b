#[cfg(target_os = "windows")]
mod windows;

use crate::model::EntryKind;
use std::io;
use std::path::Path;

/// Create a symlink at `link` whose link-value is `source`.
#[cfg(unix)]
pub fn create_symlink(source: &Path, link: &Path, _kind: EntryKind) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(target_os = "windows")]
pub fn create_symlink(source: &Path, link: &Path, kind: EntryKind) -> io::Result<()> {
    windows::create_symlink(source, link, kind)
}

/// Remove a symlink without touching what it points to.
#[cfg(unix)]
pub fn remove_symlink(link: &Path) -> io::Result<()> {
    std::fs::remove_file(link)
}

#[cfg(target_os = "windows")]
pub fn remove_symlink(link: &Path) -> io::Result<()> {
    windows::remove_symlink(link)
}
