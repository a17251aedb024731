//! Property-based tests for determinism guarantees

use multiverse::cid::{Cid, ContentType, HashAlgorithm};
use multiverse::tree::{Node, TreeNode};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn content_type() -> impl Strategy<Value = ContentType> {
    prop_oneof![Just(ContentType::Raw), Just(ContentType::Tree)]
}

fn hash_algorithm() -> impl Strategy<Value = HashAlgorithm> {
    prop_oneof![Just(HashAlgorithm::Sha2_256), Just(HashAlgorithm::Blake3)]
}

fn link_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.-]{1,16}".prop_filter("reserved names", |name| name != "." && name != "..")
}

/// Every CID survives its string and binary forms unchanged
#[test]
fn test_cid_roundtrip_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(content_type(), hash_algorithm(), any::<Vec<u8>>()),
            |(content_type, algorithm, data)| {
                let cid = Cid::hash_with(algorithm, content_type, &data);

                prop_assert_eq!(Cid::decode(&cid.to_string()).unwrap(), cid);
                prop_assert_eq!(Cid::from_bytes(&cid.to_bytes()).unwrap(), cid);
                prop_assert!(cid.verify(&data));

                Ok(())
            },
        )
        .unwrap();
}

/// Hashing is a pure function of the bytes
#[test]
fn test_leaf_cid_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<Vec<u8>>(), any::<Vec<u8>>()), |(first, second)| {
            let a = Node::leaf(first.clone()).cid();
            let b = Node::leaf(second.clone()).cid();

            if first == second {
                prop_assert_eq!(a, b);
            } else {
                // A collision here would be a broken hash function.
                prop_assert_ne!(a, b);
            }
            Ok(())
        })
        .unwrap();
}

proptest! {
    /// The encoded tree does not depend on the order links were added in
    #[test]
    fn tree_encoding_ignores_insertion_order(
        links in prop::collection::btree_map(link_name(), any::<Vec<u8>>(), 0..12)
    ) {
        let links: Vec<(String, Cid)> = links
            .into_iter()
            .map(|(name, data)| (name, Node::leaf(data).cid()))
            .collect();

        let forward = TreeNode::from_links(links.iter().cloned());
        let backward = TreeNode::from_links(links.iter().rev().cloned());

        let mut incremental = TreeNode::new();
        for (name, cid) in links.iter().rev() {
            incremental = incremental.set_link(name.clone(), *cid);
        }

        prop_assert_eq!(forward.encode(), backward.encode());
        prop_assert_eq!(forward.encode(), incremental.encode());
        prop_assert_eq!(
            Node::from(forward.clone()).cid(),
            Node::from(backward).cid()
        );
        prop_assert_eq!(TreeNode::decode(&forward.encode()).unwrap(), forward);
    }

    /// Setting then removing a fresh link restores the original tree
    #[test]
    fn set_then_remove_restores_tree(
        links in prop::collection::btree_map(link_name(), any::<Vec<u8>>(), 0..8),
        extra in link_name(),
    ) {
        let existing: BTreeMap<String, Cid> = links
            .into_iter()
            .map(|(name, data)| (name, Node::leaf(data).cid()))
            .collect();
        prop_assume!(!existing.contains_key(&extra));

        let tree = TreeNode::from_links(existing.clone());
        let edited = tree
            .set_link(extra.clone(), Node::leaf(b"extra".to_vec()).cid())
            .remove_link(&extra);

        prop_assert_eq!(edited.encode(), tree.encode());
    }

    /// Replacing the last character with one outside the base32 alphabet never decodes
    #[test]
    fn corrupted_trailing_character_fails(
        data in any::<Vec<u8>>(),
        bad in prop::sample::select(vec!['0', '1', '8', '9', '!', '=']),
    ) {
        let mut encoded = Node::leaf(data).cid().to_string();
        encoded.pop();
        encoded.push(bad);

        prop_assert!(Cid::decode(&encoded).is_err());
    }
}
