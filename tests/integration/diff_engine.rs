//! Integration tests for the tree diff engine over pushed trees

use multiverse::commands::{build_in_memory, diff_references, push, status, Reference};
use multiverse::ignore::IgnoreRules;
use multiverse::store::{BlobStore, MemoryStore};
use multiverse::tree::{diff, ChangeKind, DiffEntry};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use super::test_utils::{write_files, CountingStore};

fn rendered(entries: &[DiffEntry]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}

/// Push, status, delete, re-hash and diff against the pushed root
#[test]
fn test_push_status_remove_diff_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(root, &[("a.txt", "hello"), ("b/c.txt", "world")]);

    let store = MemoryStore::new();
    let report = push(root, IgnoreRules::builtin(), &store).unwrap();
    assert_eq!(report.uploaded, 4);

    let entries = status(root, IgnoreRules::builtin(), &store).unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e.present));

    fs::remove_file(root.join("b").join("c.txt")).unwrap();
    let (changed_root, staged) = build_in_memory(root, IgnoreRules::builtin()).unwrap();
    assert_ne!(changed_root, report.root);

    for cid in staged.cids() {
        store.add(&staged.get(&cid).unwrap()).unwrap();
    }

    let changes = diff(&store, &report.root, &changed_root).unwrap();
    assert!(changes.contains(&DiffEntry::new(
        vec!["b".to_string(), "c.txt".to_string()],
        ChangeKind::Removed
    )));
    assert!(!changes.iter().any(|e| e.path_string() == "/a.txt"));
}

#[test]
fn test_identical_roots_touch_no_store() {
    let temp_dir = TempDir::new().unwrap();
    write_files(temp_dir.path(), &[("a.txt", "hello")]);

    let store = CountingStore::new(MemoryStore::new());
    let root = push(temp_dir.path(), IgnoreRules::builtin(), &store).unwrap().root;
    store.reset();

    assert!(diff(&store, &root, &root).unwrap().is_empty());
    assert_eq!(store.get_calls(), 0);
}

/// Unchanged sibling subtrees are skipped without being fetched
#[test]
fn test_unchanged_subtrees_are_not_fetched() {
    let temp_dir = TempDir::new().unwrap();
    write_files(
        temp_dir.path(),
        &[("big/one.txt", "1"), ("big/two.txt", "2"), ("small/x.txt", "x")],
    );

    let store = CountingStore::new(MemoryStore::new());
    let before = push(temp_dir.path(), IgnoreRules::builtin(), &store).unwrap().root;
    fs::write(temp_dir.path().join("small/x.txt"), "y").unwrap();
    let after = push(temp_dir.path(), IgnoreRules::builtin(), &store).unwrap().root;
    store.reset();

    let changes = diff(&store, &before, &after).unwrap();
    assert_eq!(rendered(&changes), vec!["* /small/x.txt"]);
    // Two roots plus the two versions of "small".
    assert_eq!(store.get_calls(), 4);
}

#[test]
fn test_diff_is_symmetric_in_kind() {
    let temp_dir = TempDir::new().unwrap();
    let left = temp_dir.path().join("left");
    let right = temp_dir.path().join("right");
    write_files(&left, &[("keep.txt", "same"), ("gone.txt", "bye"), ("edit.txt", "v1")]);
    write_files(&right, &[("keep.txt", "same"), ("edit.txt", "v2"), ("new/file.txt", "hi")]);

    let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
    let forward = diff_references(
        store.clone(),
        &Reference::Path(left.clone()),
        &Reference::Path(right.clone()),
    )
    .unwrap();
    let backward =
        diff_references(store, &Reference::Path(right), &Reference::Path(left)).unwrap();

    assert_eq!(
        rendered(&forward),
        vec!["* /edit.txt", "- /gone.txt", "+ /new"]
    );
    assert_eq!(
        rendered(&backward),
        vec!["* /edit.txt", "+ /gone.txt", "- /new"]
    );
}

/// Diffing a pushed root against the working tree needs no upload
#[test]
fn test_diff_pushed_root_against_working_tree() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_files(root, &[("a.txt", "hello"), ("b/c.txt", "world")]);

    let backing = Arc::new(MemoryStore::new());
    let pushed = push(root, IgnoreRules::builtin(), &backing).unwrap().root;
    let stored_before = backing.len();

    write_files(root, &[("b/c.txt", "changed"), ("b/new.txt", "fresh")]);

    let store: Arc<dyn BlobStore> = backing.clone();
    let changes = diff_references(
        store,
        &Reference::Cid(pushed),
        &Reference::Path(root.to_path_buf()),
    )
    .unwrap();

    assert_eq!(rendered(&changes), vec!["* /b/c.txt", "+ /b/new.txt"]);
    assert_eq!(backing.len(), stored_before);
}
