//! Integration tests for tree hashing determinism

use multiverse::cid::ContentType;
use multiverse::ignore::IgnoreRules;
use multiverse::tree::builder::TreeBuilder;
use multiverse::tree::Node;
use multiverse::{Cid, StorageError, TreeNode};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::test_utils::write_files;

/// The same filesystem produces the same root CID
#[test]
fn test_same_filesystem_same_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    write_files(
        &root,
        &[
            ("file1.txt", "content1"),
            ("file2.txt", "content2"),
            ("dir1/file3.txt", "content3"),
        ],
    );

    let builder = TreeBuilder::new(root.clone());
    assert_eq!(builder.compute_root().unwrap(), builder.compute_root().unwrap());
}

/// Identical trees in different locations hash identically
#[test]
fn test_location_independent_root() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let files = [("a.txt", "hello"), ("b/c.txt", "world"), ("b/d/e.bin", "\u{1}\u{2}")];
    write_files(first.path(), &files);
    write_files(second.path(), &files);

    assert_eq!(
        TreeBuilder::new(first.path()).compute_root().unwrap(),
        TreeBuilder::new(second.path()).compute_root().unwrap()
    );
}

/// Creation order of entries does not leak into the hash
#[test]
fn test_creation_order_independent_root() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_files(first.path(), &[("z.txt", "z"), ("a.txt", "a"), ("m/n.txt", "n")]);
    write_files(second.path(), &[("m/n.txt", "n"), ("a.txt", "a"), ("z.txt", "z")]);

    assert_eq!(
        TreeBuilder::new(first.path()).compute_root().unwrap(),
        TreeBuilder::new(second.path()).compute_root().unwrap()
    );
}

/// Empty directories are hashed as empty tree nodes, consistently
#[test]
fn test_empty_directory_consistent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    fs::create_dir(root.join("empty")).unwrap();

    let builder = TreeBuilder::new(root.clone());
    let root1 = builder.compute_root().unwrap();
    let root2 = builder.compute_root().unwrap();
    assert_eq!(root1, root2);
    assert_eq!(root1.content_type(), ContentType::Tree);

    let mut empty_cid = None;
    builder
        .traverse(&mut |path: &Path, cid: &Cid, node: &Node| -> Result<(), StorageError> {
            if path == Path::new("empty") {
                assert!(node.as_tree().unwrap().is_empty());
                empty_cid = Some(*cid);
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(empty_cid, Some(Node::from(TreeNode::new()).cid()));
}

/// A single file can be the root of a traversal
#[test]
fn test_file_root_is_leaf() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("only.txt");
    fs::write(&file, "solo").unwrap();

    let cid = TreeBuilder::new(file).compute_root().unwrap();
    assert_eq!(cid, Node::leaf(b"solo".to_vec()).cid());
    assert_eq!(cid.content_type(), ContentType::Raw);
}

/// Children are reported before their parents and the root comes last
#[test]
fn test_post_order_visits() {
    let temp_dir = TempDir::new().unwrap();
    write_files(temp_dir.path(), &[("a.txt", "hello"), ("b/c.txt", "world")]);

    let mut visited: Vec<PathBuf> = Vec::new();
    let root = TreeBuilder::new(temp_dir.path())
        .traverse(&mut |path: &Path, _: &Cid, _: &Node| -> Result<(), StorageError> {
            visited.push(path.to_path_buf());
            Ok(())
        })
        .unwrap();

    let position = |p: &str| visited.iter().position(|v| v == Path::new(p)).unwrap();
    assert!(position("b/c.txt") < position("b"));
    assert!(position("a.txt") < position(""));
    assert!(position("b") < position(""));
    assert_eq!(visited.last().unwrap(), Path::new(""));
    assert_eq!(visited.len(), 4);
    assert_eq!(root.content_type(), ContentType::Tree);
}

/// Ignored entries never reach the hash
#[test]
fn test_ignored_entries_do_not_affect_root() {
    let clean = TempDir::new().unwrap();
    let noisy = TempDir::new().unwrap();
    write_files(clean.path(), &[("src/main.rs", "fn main() {}")]);
    write_files(
        noisy.path(),
        &[
            ("src/main.rs", "fn main() {}"),
            (".git/HEAD", "ref: refs/heads/main"),
            ("target/debug/app", "binary"),
        ],
    );

    let ignore = IgnoreRules::builtin().with_patterns(["target/"]);
    assert_eq!(
        TreeBuilder::new(clean.path()).compute_root().unwrap(),
        TreeBuilder::new(noisy.path())
            .with_ignore(ignore)
            .compute_root()
            .unwrap()
    );
}

/// Patterns from the root .gitignore are honored
#[test]
fn test_gitignore_patterns() {
    let temp_dir = TempDir::new().unwrap();
    write_files(
        temp_dir.path(),
        &[(".gitignore", "*.log\n"), ("keep.txt", "keep"), ("debug.log", "noise")],
    );

    let with_log = TreeBuilder::new(temp_dir.path())
        .with_ignore(IgnoreRules::for_root(temp_dir.path()))
        .compute_root()
        .unwrap();

    fs::remove_file(temp_dir.path().join("debug.log")).unwrap();
    let without_log = TreeBuilder::new(temp_dir.path())
        .with_ignore(IgnoreRules::for_root(temp_dir.path()))
        .compute_root()
        .unwrap();

    assert_eq!(with_log, without_log);
}

/// Editing the workspace config never changes the root
#[test]
fn test_workspace_config_is_not_hashed() {
    let temp_dir = TempDir::new().unwrap();
    write_files(temp_dir.path(), &[("a.txt", "hello")]);
    let before = TreeBuilder::new(temp_dir.path()).compute_root().unwrap();

    write_files(
        temp_dir.path(),
        &[(".multiverse.toml", "default_remote = \"local\"\n")],
    );
    assert_eq!(TreeBuilder::new(temp_dir.path()).compute_root().unwrap(), before);

    write_files(temp_dir.path(), &[("nested/.multiverse.toml", "x")]);
    assert_ne!(TreeBuilder::new(temp_dir.path()).compute_root().unwrap(), before);
}
