#![allow(dead_code)]

use organizer_core::classifier::Classifier;
use organizer_core::config::DEFAULT_ALLOWED_ROOTS;
use organizer_core::storage::{Ledger, MemoryLedger};
use organizer_core::{Categorization, Entry, Error, ReclassifyPolicy, RunMode, Settings};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn allowed_roots() -> Vec<String> {
    DEFAULT_ALLOWED_ROOTS.iter().map(|s| s.to_string()).collect()
}

/// Source and target roots inside one temp dir, canonicalized.
pub fn make_roots(tmp: &Path) -> (PathBuf, PathBuf) {
    let source = tmp.join("source");
    let target = tmp.join("target");
    fs::create_dir_all(&source).unwrap();
    fs::create_dir_all(&target).unwrap();
    (
        fs::canonicalize(source).unwrap(),
        fs::canonicalize(target).unwrap(),
    )
}

pub fn settings(source: &Path, target: &Path, mode: RunMode, policy: ReclassifyPolicy) -> Settings {
    Settings {
        source_root: source.to_path_buf(),
        target_root: target.to_path_buf(),
        data_dir: target.join(".organizer"),
        run_mode: mode,
        allowed_roots: allowed_roots(),
        ignore_patterns: vec![],
        policy,
        interval: Duration::from_secs(600),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File(Vec<u8>),
    Link(PathBuf),
}

/// Every object below `root`, keyed by relative path. Symlinks are not
/// followed.
pub fn snapshot(root: &Path) -> BTreeMap<String, Node> {
    let mut nodes = BTreeMap::new();
    collect(root, root, &mut nodes);
    nodes
}

fn collect(root: &Path, dir: &Path, nodes: &mut BTreeMap<String, Node>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let rel = path
            .strip_prefix(root)
            .unwrap()
            .to_string_lossy()
            .into_owned();
        let file_type = entry.file_type().unwrap();
        if file_type.is_symlink() {
            nodes.insert(rel, Node::Link(fs::read_link(&path).unwrap()));
        } else if file_type.is_dir() {
            nodes.insert(rel, Node::Dir);
            collect(root, &path, nodes);
        } else {
            nodes.insert(rel, Node::File(fs::read(&path).unwrap()));
        }
    }
}

pub fn categorization(source: Entry, targets: &[&str]) -> Categorization {
    Categorization {
        source,
        targets: targets.iter().map(|t| t.to_string()).collect(),
    }
}

#[derive(Default)]
struct FakeState {
    results: Mutex<Vec<Categorization>>,
    requests: Mutex<Vec<Vec<Entry>>>,
    fail: Mutex<bool>,
}

/// Classifier returning canned results for whichever requested entries it
/// knows about. Clones share state so a test can inspect calls afterwards.
#[derive(Clone, Default)]
pub struct FakeClassifier {
    state: Arc<FakeState>,
}

impl FakeClassifier {
    pub fn new(results: Vec<Categorization>) -> Self {
        let fake = Self::default();
        fake.set_results(results);
        fake
    }

    pub fn set_results(&self, results: Vec<Categorization>) {
        *self.state.results.lock().unwrap() = results;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.state.fail.lock().unwrap() = fail;
    }

    pub fn requests(&self) -> Vec<Vec<Entry>> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Classifier for FakeClassifier {
    fn classify(&self, items: &[Entry]) -> Result<Vec<Categorization>, Error> {
        self.state.requests.lock().unwrap().push(items.to_vec());
        if *self.state.fail.lock().unwrap() {
            return Err(Error::Classifier("upstream unavailable".to_string()));
        }
        Ok(self
            .state
            .results
            .lock()
            .unwrap()
            .iter()
            .filter(|c| items.iter().any(|item| item.name == c.source.name))
            .cloned()
            .collect())
    }
}

/// Memory ledger whose writes fail for one name.
pub struct FlakyLedger {
    inner: MemoryLedger,
    failing: String,
}

impl FlakyLedger {
    pub fn failing_on(name: &str) -> Self {
        Self {
            inner: MemoryLedger::new(),
            failing: name.to_string(),
        }
    }
}

impl Ledger for FlakyLedger {
    fn is_processed(&self, name: &str) -> Result<bool, Error> {
        self.inner.is_processed(name)
    }

    fn mark_processed(&self, name: &str) -> Result<(), Error> {
        if name == self.failing {
            return Err(Error::Other(format!("disk full while recording {}", name)));
        }
        self.inner.mark_processed(name)
    }

    fn count(&self) -> Result<usize, Error> {
        self.inner.count()
    }

    fn processed_names(&self) -> Result<Vec<String>, Error> {
        self.inner.processed_names()
    }

    fn clear(&self) -> Result<(), Error> {
        self.inner.clear()
    }
}
