#![cfg(unix)]

mod common;

use common::{allowed_roots, make_roots, snapshot, Node};
use organizer_core::linker::{LinkOutcome, Reconciler, TargetPath};
use organizer_core::{Entry, EntryKind, RunMode};
use std::fs;
use std::os::unix::fs::symlink;
use tempfile::tempdir;

#[test]
fn test_creates_file_link_inside_target_dir() {
    let tmp = tempdir().unwrap();
    let (source, target) = make_roots(tmp.path());
    fs::write(source.join("Nichijou.S01E01.mkv"), "video").unwrap();
    let roots = allowed_roots();
    let reconciler = Reconciler::new(&target, &roots, RunMode::Apply);

    let outcome = reconciler.link_entry(&source, &Entry::file("Nichijou.S01E01.mkv"), "Anime/Nichijou");

    assert_eq!(outcome, LinkOutcome::Created);
    let link = target.join("Anime/Nichijou/Nichijou.S01E01.mkv");
    assert_eq!(fs::read_link(&link).unwrap(), source.join("Nichijou.S01E01.mkv"));
    assert_eq!(fs::read(&link).unwrap(), b"video");
}

#[test]
fn test_existing_correct_link_is_left_alone() {
    let tmp = tempdir().unwrap();
    let (source, target) = make_roots(tmp.path());
    fs::create_dir_all(source.join("Blame!")).unwrap();
    let roots = allowed_roots();
    let reconciler = Reconciler::new(&target, &roots, RunMode::Apply);
    let entry = Entry::folder("Blame!");

    assert_eq!(reconciler.link_entry(&source, &entry, "Manga/Blame!"), LinkOutcome::Created);
    let before = fs::symlink_metadata(target.join("Manga/Blame!")).unwrap();

    assert_eq!(
        reconciler.link_entry(&source, &entry, "Manga/Blame!"),
        LinkOutcome::AlreadyLinked
    );
    let after = fs::symlink_metadata(target.join("Manga/Blame!")).unwrap();
    assert_eq!(before.modified().unwrap(), after.modified().unwrap());
}

#[test]
fn test_stale_link_is_replaced() {
    let tmp = tempdir().unwrap();
    let (source, target) = make_roots(tmp.path());
    fs::create_dir_all(source.join("Blame!")).unwrap();
    fs::create_dir_all(target.join("Manga")).unwrap();
    symlink(source.join("Old Name"), target.join("Manga/Blame!")).unwrap();
    let roots = allowed_roots();
    let reconciler = Reconciler::new(&target, &roots, RunMode::Apply);

    let outcome = reconciler.link_entry(&source, &Entry::folder("Blame!"), "Manga/Blame!");

    assert_eq!(outcome, LinkOutcome::Replaced);
    assert_eq!(
        fs::read_link(target.join("Manga/Blame!")).unwrap(),
        source.join("Blame!")
    );
}

#[test]
fn test_foreign_objects_are_never_overwritten() {
    let tmp = tempdir().unwrap();
    let (source, target) = make_roots(tmp.path());
    fs::write(source.join("song.flac"), "new").unwrap();
    fs::create_dir_all(source.join("Album")).unwrap();
    fs::create_dir_all(target.join("Music/Album")).unwrap();
    fs::write(target.join("Music/song.flac"), "precious").unwrap();
    let roots = allowed_roots();
    let reconciler = Reconciler::new(&target, &roots, RunMode::Apply);

    assert_eq!(
        reconciler.link_entry(&source, &Entry::file("song.flac"), "Music"),
        LinkOutcome::ForeignObject
    );
    assert_eq!(
        reconciler.link_entry(&source, &Entry::folder("Album"), "Music/Album"),
        LinkOutcome::ForeignObject
    );
    assert_eq!(fs::read(target.join("Music/song.flac")).unwrap(), b"precious");
    assert!(fs::symlink_metadata(target.join("Music/Album"))
        .unwrap()
        .file_type()
        .is_dir());
}

#[test]
fn test_unlisted_root_touches_nothing() {
    let tmp = tempdir().unwrap();
    let (source, target) = make_roots(tmp.path());
    fs::create_dir_all(source.join("Random")).unwrap();
    let roots = allowed_roots();
    let reconciler = Reconciler::new(&target, &roots, RunMode::Apply);
    let before = snapshot(&target);

    for raw in ["Downloads/Random", "../escape", "/abs/path", "Anime"] {
        assert_eq!(
            reconciler.link_entry(&source, &Entry::folder("Random"), raw),
            LinkOutcome::Rejected,
            "target {raw}"
        );
    }
    assert_eq!(snapshot(&target), before);
}

#[test]
fn test_never_links_through_a_linked_folder() {
    let tmp = tempdir().unwrap();
    let (source, target) = make_roots(tmp.path());
    fs::create_dir_all(source.join("Blame!")).unwrap();
    fs::write(source.join("extra.cbz"), "x").unwrap();
    let roots = allowed_roots();
    let reconciler = Reconciler::new(&target, &roots, RunMode::Apply);

    reconciler.link_entry(&source, &Entry::folder("Blame!"), "Manga/Blame!");
    let outcome = reconciler.link_entry(&source, &Entry::file("extra.cbz"), "Manga/Blame!");

    assert_eq!(outcome, LinkOutcome::ForeignObject);
    assert!(!source.join("Blame!/extra.cbz").exists());
}

#[test]
fn test_dry_run_plans_without_mutation() {
    let tmp = tempdir().unwrap();
    let (source, target) = make_roots(tmp.path());
    fs::write(source.join("a.mkv"), "a").unwrap();
    fs::create_dir_all(target.join("Movies")).unwrap();
    symlink(source.join("b.mkv"), target.join("Movies/a.mkv")).unwrap();
    let roots = allowed_roots();
    let reconciler = Reconciler::new(&target, &roots, RunMode::DryRun);
    let before = snapshot(&target);

    assert_eq!(
        reconciler.link_entry(&source, &Entry::file("a.mkv"), "Movies"),
        LinkOutcome::Planned
    );
    assert_eq!(
        reconciler.link_entry(&source, &Entry::file("a.mkv"), "Anime/New Show"),
        LinkOutcome::Planned
    );
    assert_eq!(snapshot(&target), before);
    assert_eq!(
        before.get("Movies/a.mkv"),
        Some(&Node::Link(source.join("b.mkv")))
    );
}

#[test]
fn test_ensure_link_with_prevalidated_target() {
    let tmp = tempdir().unwrap();
    let (source, target) = make_roots(tmp.path());
    fs::write(source.join("setup.exe"), "bin").unwrap();
    let roots = allowed_roots();
    let reconciler = Reconciler::new(&target, &roots, RunMode::Apply);
    let path = TargetPath::parse("Software/Tools/setup.exe", &roots).unwrap();

    let outcome = reconciler.ensure_link(&source.join("setup.exe"), &path, EntryKind::File);

    assert_eq!(outcome, LinkOutcome::Created);
    assert!(target.join("Software/Tools").is_dir());
}
