use crate::model::EntryKind;
use std::fs;
use std::io;
use std::os::windows::fs::{symlink_dir, symlink_file, FileTypeExt};
use std::path::Path;

pub fn create_symlink(source: &Path, link: &Path, kind: EntryKind) -> io::Result<()> {
    match kind {
        EntryKind::File => symlink_file(source, link),
        EntryKind::Folder => symlink_dir(source, link),
    }
}

// Directory symlinks must be removed with remove_dir on Windows.
pub fn remove_symlink(link: &Path) -> io::Result<()> {
    let file_type = fs::symlink_metadata(link)?.file_type();
    if file_type.is_symlink_dir() {
        fs::remove_dir(link)
    } else {
        fs::remove_file(link)
    }
}
