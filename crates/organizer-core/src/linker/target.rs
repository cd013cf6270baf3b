use crate::model::{Entry, EntryKind};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a classifier-provided target was not admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    Absolute,
    InvalidSegment(String),
    RootNotAllowed(String),
    /// A folder link would replace a category root itself.
    CategoryRoot(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Empty => write!(f, "target path is empty"),
            Rejection::Absolute => write!(f, "target path is absolute"),
            Rejection::InvalidSegment(seg) => write!(f, "invalid path segment '{}'", seg),
            Rejection::RootNotAllowed(root) => {
                write!(f, "'{}' is not one of the allowed root folders", root)
            }
            Rejection::CategoryRoot(root) => {
                write!(f, "folder link would replace category root '{}'", root)
            }
        }
    }
}

/// A relative, slash-separated target path whose first segment is an
/// allow-listed root category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetPath {
    segments: Vec<String>,
}

impl TargetPath {
    pub fn parse(raw: &str, allowed_roots: &[String]) -> Result<Self, Rejection> {
        let trimmed = raw.trim();
        if trimmed.starts_with('/') {
            return Err(Rejection::Absolute);
        }
        let trimmed = trimmed.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(Rejection::Empty);
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains('\\')
                || segment.contains('\0')
            {
                return Err(Rejection::InvalidSegment(segment.to_string()));
            }
            segments.push(segment.to_string());
        }

        let root = &segments[0];
        if !allowed_roots.iter().any(|allowed| allowed == root) {
            return Err(Rejection::RootNotAllowed(root.clone()));
        }

        Ok(TargetPath { segments })
    }

    /// Final link location for `entry`: files go inside the target directory,
    /// folders are linked at the target path itself.
    pub fn resolve(raw: &str, entry: &Entry, allowed_roots: &[String]) -> Result<Self, Rejection> {
        let mut target = Self::parse(raw, allowed_roots)?;
        match entry.kind {
            EntryKind::File => target.segments.push(entry.name.clone()),
            EntryKind::Folder if target.segments.len() == 1 => {
                return Err(Rejection::CategoryRoot(target.segments.remove(0)));
            }
            EntryKind::Folder => {}
        }
        Ok(target)
    }

    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn under(&self, base: &Path) -> PathBuf {
        let mut path = base.to_path_buf();
        path.extend(self.segments.iter());
        path
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> Vec<String> {
        vec!["Anime".to_string(), "TV Shows".to_string()]
    }

    #[test]
    fn test_parse_normalizes_trailing_slash() {
        let target = TargetPath::parse(" TV Shows/Nichijou/ ", &roots()).unwrap();
        assert_eq!(target.to_string(), "TV Shows/Nichijou");
        assert_eq!(target.root(), "TV Shows");
    }

    #[test]
    fn test_parse_rejects_unlisted_root() {
        assert_eq!(
            TargetPath::parse("Downloads/Random", &roots()),
            Err(Rejection::RootNotAllowed("Downloads".to_string()))
        );
        // Allow-list matching is exact.
        assert!(TargetPath::parse("anime/x", &roots()).is_err());
    }

    #[test]
    fn test_parse_rejects_escapes() {
        assert_eq!(TargetPath::parse("/Anime/x", &roots()), Err(Rejection::Absolute));
        assert_eq!(TargetPath::parse("", &roots()), Err(Rejection::Empty));
        assert_eq!(
            TargetPath::parse("Anime/../../etc", &roots()),
            Err(Rejection::InvalidSegment("..".to_string()))
        );
        assert!(TargetPath::parse("Anime//x", &roots()).is_err());
        assert!(TargetPath::parse("Anime/a\\b", &roots()).is_err());
    }

    #[test]
    fn test_resolve_appends_file_name() {
        let entry = Entry::file("Nichijou.S01E01.mkv");
        let target = TargetPath::resolve("Anime", &entry, &roots()).unwrap();
        assert_eq!(target.to_string(), "Anime/Nichijou.S01E01.mkv");
    }

    #[test]
    fn test_resolve_folder_keeps_path() {
        let entry = Entry::folder("Blame!");
        let target = TargetPath::resolve("Anime/Blame!", &entry, &roots()).unwrap();
        assert_eq!(target.to_string(), "Anime/Blame!");
        assert_eq!(
            TargetPath::resolve("Anime", &entry, &roots()),
            Err(Rejection::CategoryRoot("Anime".to_string()))
        );
    }

    #[test]
    fn test_under_joins_segments() {
        let target = TargetPath::parse("Anime/Blame!", &roots()).unwrap();
        assert_eq!(
            target.under(Path::new("/media/target")),
            PathBuf::from("/media/target/Anime/Blame!")
        );
    }
}
