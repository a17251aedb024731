//! RemoteStore against a mocked blob server
//!
//! The store drives its own runtime, so tests stay synchronous and the mock server runs
//! on a separate multi-threaded runtime.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use multiverse::commands::{pull, push};
use multiverse::ignore::IgnoreRules;
use multiverse::store::{BlobStore, RemoteStore};
use multiverse::tree::{Node, TreeNode};
use multiverse::StorageError;
use serde_json::json;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::test_utils::write_files;

fn mock_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

fn serve_blob(runtime: &Runtime, server: &MockServer, node: &Node) {
    let cid = node.cid();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/api/get"))
            .and(body_json(json!({ "Root": cid.to_string(), "Path": "" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Content": BASE64_STANDARD.encode(node.encode()),
            })))
            .mount(server),
    );
}

fn fallback_status(runtime: &Runtime, server: &MockServer, status: u16) {
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/api/get"))
            .respond_with(ResponseTemplate::new(status))
            .with_priority(10)
            .mount(server),
    );
}

#[test]
fn test_get_and_has_present_blob() {
    let runtime = mock_runtime();
    let server = runtime.block_on(MockServer::start());
    let node = Node::leaf(b"remote bytes".to_vec());
    serve_blob(&runtime, &server, &node);

    let store = RemoteStore::new(&server.uri()).unwrap();
    assert!(store.has(&node.cid()).unwrap());
    assert_eq!(store.get(&node.cid()).unwrap(), node);
}

#[test]
fn test_missing_blob_is_not_found() {
    let runtime = mock_runtime();
    let server = runtime.block_on(MockServer::start());
    fallback_status(&runtime, &server, 404);

    let store = RemoteStore::new(&server.uri()).unwrap();
    let cid = Node::leaf(b"absent".to_vec()).cid();
    assert!(!store.has(&cid).unwrap());
    assert!(matches!(store.get(&cid), Err(StorageError::NotFound(missing)) if missing == cid));
}

#[test]
fn test_server_error_propagates_from_has() {
    let runtime = mock_runtime();
    let server = runtime.block_on(MockServer::start());
    fallback_status(&runtime, &server, 500);

    let store = RemoteStore::new(&server.uri()).unwrap();
    let cid = Node::leaf(b"x".to_vec()).cid();
    assert!(matches!(
        store.has(&cid),
        Err(StorageError::UnexpectedStatus { status: 500, .. })
    ));
}

#[test]
fn test_wrong_bytes_are_rejected() {
    let runtime = mock_runtime();
    let server = runtime.block_on(MockServer::start());
    let wanted = Node::leaf(b"wanted".to_vec()).cid();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/api/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Content": BASE64_STANDARD.encode(b"something else"),
            })))
            .mount(&server),
    );

    let store = RemoteStore::new(&server.uri()).unwrap();
    assert!(matches!(store.get(&wanted), Err(StorageError::Integrity { .. })));
}

#[test]
fn test_add_uploads_single_blob() {
    let runtime = mock_runtime();
    let server = runtime.block_on(MockServer::start());
    let node = Node::from(TreeNode::from_links([(
        "a.txt",
        Node::leaf(b"hello".to_vec()).cid(),
    )]));
    let cid = node.cid();

    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/api/update"))
            .and(body_json(json!({
                "Root": "",
                "Blobs": [{
                    "Type": "directory",
                    "Path": "",
                    "Content": BASE64_STANDARD.encode(node.encode()),
                }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Root": cid.to_string() })))
            .expect(1)
            .mount(&server),
    );

    let store = RemoteStore::new(&server.uri()).unwrap();
    assert_eq!(store.add(&node).unwrap(), cid);
}

#[test]
fn test_add_rejects_mismatched_echo() {
    let runtime = mock_runtime();
    let server = runtime.block_on(MockServer::start());
    let other = Node::leaf(b"other".to_vec()).cid();
    runtime.block_on(
        Mock::given(method("POST"))
            .and(path("/api/update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Root": other.to_string() })))
            .mount(&server),
    );

    let store = RemoteStore::new(&server.uri()).unwrap();
    assert!(matches!(
        store.add(&Node::leaf(b"mine".to_vec())),
        Err(StorageError::Integrity { .. })
    ));
}

/// A full push then pull, with the mock standing in for an empty then populated server
#[test]
fn test_push_then_pull_over_http() {
    let runtime = mock_runtime();
    let server = runtime.block_on(MockServer::start());

    let source = TempDir::new().unwrap();
    write_files(source.path(), &[("a.txt", "hello")]);

    let leaf = Node::leaf(b"hello".to_vec());
    let root = Node::from(TreeNode::from_links([("a.txt", leaf.cid())]));

    // Nothing is present yet: every existence check misses and both nodes are uploaded.
    fallback_status(&runtime, &server, 404);
    for (node, kind) in [(&leaf, "file"), (&root, "directory")] {
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/api/update"))
                .and(body_json(json!({
                    "Root": "",
                    "Blobs": [{
                        "Type": kind,
                        "Path": "",
                        "Content": BASE64_STANDARD.encode(node.encode()),
                    }],
                })))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "Root": node.cid().to_string() })),
                )
                .expect(1)
                .mount(&server),
        );
    }

    let store = RemoteStore::new(&server.uri()).unwrap();
    let report = push(source.path(), IgnoreRules::builtin(), &store).unwrap();
    assert_eq!(report.root, root.cid());
    assert_eq!(report.uploaded, 2);

    serve_blob(&runtime, &server, &leaf);
    serve_blob(&runtime, &server, &root);

    let target = TempDir::new().unwrap();
    let checkout = target.path().join("checkout");
    pull(&store, &report.root, &checkout).unwrap();
    assert_eq!(std::fs::read_to_string(checkout.join("a.txt")).unwrap(), "hello");
}
