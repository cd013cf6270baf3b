use crate::error::Error;
use crate::model::{Entry, EntryKind};
use glob::Pattern;
use std::path::Path;
use tracing::{trace, warn};
use walkdir::WalkDir;

/// List the immediate children of `root`, without following symlinks.
///
/// Regular files are `File`; everything else (directories, symlinks, special
/// files) is `Folder`. Entries matching an ignore pattern or with non-UTF-8
/// names are skipped. Output is sorted by name.
pub fn list_root_entries(root: &Path, ignore_patterns: &[Pattern]) -> Result<Vec<Entry>, Error> {
    let mut entries = Vec::new();

    for dir_entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let dir_entry = dir_entry?;

        let name = match dir_entry.file_name().to_str() {
            Some(name) => name.to_string(),
            None => {
                warn!(
                    "Skipping {}: name is not valid UTF-8",
                    dir_entry.path().display()
                );
                continue;
            }
        };

        if is_ignored(&name, ignore_patterns) {
            trace!("Ignoring {}", name);
            continue;
        }

        let kind = if dir_entry.file_type().is_file() {
            EntryKind::File
        } else {
            EntryKind::Folder
        };
        entries.push(Entry { name, kind });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

pub fn is_ignored(name: &str, ignore_patterns: &[Pattern]) -> bool {
    ignore_patterns.iter().any(|pattern| pattern.matches(name))
}
