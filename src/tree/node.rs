//! DAG node types and their canonical encodings

use crate::cid::{Cid, ContentType, HashAlgorithm};
use crate::error::{DecodeError, StorageError};
use bincode::Options;
use std::borrow::Cow;

/// Named edge from a tree node to a child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub cid: Cid,
}

/// Directory analog: links kept sorted by name, names unique
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    links: Vec<Link>,
}

/// Wire layout of a tree node: `(name, binary CID)` pairs in name order
type EncodedLinks = Vec<(String, Vec<u8>)>;

fn codec() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

impl TreeNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from links in any order; a repeated name keeps the last CID
    pub fn from_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = (S, Cid)>,
        S: Into<String>,
    {
        let mut tree = Self::new();
        for (name, cid) in links {
            tree.insert(name.into(), cid);
        }
        tree
    }

    /// Like `from_links`, but a repeated name is an error instead of an overwrite
    pub fn try_from_links<I, S>(links: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = (S, Cid)>,
        S: Into<String>,
    {
        let mut tree = Self::new();
        for (name, cid) in links {
            let name = name.into();
            match tree.position(&name) {
                Ok(_) => {
                    return Err(StorageError::InvalidPath(format!(
                        "Duplicate link name: {:?}",
                        name
                    )))
                }
                Err(index) => tree.links.insert(index, Link { name, cid }),
            }
        }
        Ok(tree)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get_link(&self, name: &str) -> Result<Cid, StorageError> {
        self.position(name)
            .map(|index| self.links[index].cid)
            .map_err(|_| StorageError::LinkNotFound(name.to_string()))
    }

    /// Copy of this tree with `name` pointing at `cid`
    pub fn set_link(&self, name: impl Into<String>, cid: Cid) -> TreeNode {
        let mut next = self.clone();
        next.insert(name.into(), cid);
        next
    }

    /// Copy of this tree without `name`; an absent name leaves the tree unchanged
    pub fn remove_link(&self, name: &str) -> TreeNode {
        let mut next = self.clone();
        if let Ok(index) = next.position(name) {
            next.links.remove(index);
        }
        next
    }

    /// Canonical bytes: identical name to CID mappings always encode identically
    pub fn encode(&self) -> Vec<u8> {
        let encoded: EncodedLinks = self
            .links
            .iter()
            .map(|link| (link.name.clone(), link.cid.to_bytes()))
            .collect();
        // Strings and byte vectors always serialize into an in-memory buffer.
        codec()
            .serialize(&encoded)
            .expect("in-memory serialization of owned links is infallible")
    }

    /// Parse canonical tree bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let encoded: EncodedLinks = codec()
            .with_limit(bytes.len() as u64)
            .deserialize(bytes)
            .map_err(|e| DecodeError::MalformedTree(e.to_string()))?;

        let mut links = Vec::with_capacity(encoded.len());
        for (name, cid_bytes) in encoded {
            if name.is_empty() {
                return Err(DecodeError::MalformedTree("empty link name".to_string()));
            }
            if let Some(Link { name: previous, .. }) = links.last() {
                if previous.as_str() >= name.as_str() {
                    return Err(DecodeError::NonCanonicalTree(name));
                }
            }
            let cid = Cid::from_bytes(&cid_bytes)?;
            links.push(Link { name, cid });
        }

        Ok(Self { links })
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.links
            .binary_search_by(|link| link.name.as_str().cmp(name))
    }

    fn insert(&mut self, name: String, cid: Cid) {
        match self.position(&name) {
            Ok(index) => self.links[index].cid = cid,
            Err(index) => self.links.insert(index, Link { name, cid }),
        }
    }
}

/// DAG node: the variant set is closed and matched exhaustively
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Opaque file bytes
    Leaf(Vec<u8>),
    /// Named links to children
    Tree(TreeNode),
}

impl Node {
    pub fn leaf(data: impl Into<Vec<u8>>) -> Self {
        Node::Leaf(data.into())
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Node::Leaf(_) => ContentType::Raw,
            Node::Tree(_) => ContentType::Tree,
        }
    }

    /// Bytes that are hashed and stored. Leaf encoding is the content itself.
    pub fn encode(&self) -> Cow<'_, [u8]> {
        match self {
            Node::Leaf(data) => Cow::Borrowed(data.as_slice()),
            Node::Tree(tree) => Cow::Owned(tree.encode()),
        }
    }

    /// CID under the default hash algorithm
    pub fn cid(&self) -> Cid {
        self.cid_with(HashAlgorithm::default())
    }

    pub fn cid_with(&self, algorithm: HashAlgorithm) -> Cid {
        Cid::hash_with(algorithm, self.content_type(), &self.encode())
    }

    /// Rebuild a node from stored bytes, dispatching on the CID's content type
    pub fn decode(content_type: ContentType, bytes: Vec<u8>) -> Result<Self, DecodeError> {
        match content_type {
            ContentType::Raw => Ok(Node::Leaf(bytes)),
            ContentType::Tree => TreeNode::decode(&bytes).map(Node::Tree),
        }
    }

    pub fn as_tree(&self) -> Option<&TreeNode> {
        match self {
            Node::Tree(tree) => Some(tree),
            Node::Leaf(_) => None,
        }
    }
}

impl From<TreeNode> for Node {
    fn from(tree: TreeNode) -> Self {
        Node::Tree(tree)
    }
}
