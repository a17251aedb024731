//! Content identifiers
//!
//! A CID is the self-describing address of one encoded node:
//! `varint(version) || varint(content type) || varint(hash code) || varint(len) || digest`,
//! rendered as multibase base32-lower text for storage keys, tags and the wire protocol.
//!
//! The content type travels inside the identifier, so traversal and diff can tell a tree
//! from a leaf without fetching the referenced bytes.

use crate::error::DecodeError;
use crate::tree::hasher;
use crate::types::{Digest, DIGEST_LEN};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The only CID format version produced and accepted
pub const CID_VERSION: u64 = 1;

/// Text encoding of every CID string
pub const CID_BASE: multibase::Base = multibase::Base::Base32Lower;

/// What the addressed bytes are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    /// Opaque file bytes
    Raw,
    /// An encoded tree node
    Tree,
}

impl ContentType {
    /// Multicodec code. Trees use a private-use code since their encoding is our own.
    pub const fn code(self) -> u64 {
        match self {
            ContentType::Raw => 0x55,
            ContentType::Tree => 0x30_0001,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, DecodeError> {
        match code {
            0x55 => Ok(ContentType::Raw),
            0x30_0001 => Ok(ContentType::Tree),
            other => Err(DecodeError::UnknownContentType(other)),
        }
    }
}

/// Hash function used to compute the digest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    Sha2_256,
    Blake3,
}

impl HashAlgorithm {
    /// Multihash code
    pub const fn code(self) -> u64 {
        match self {
            HashAlgorithm::Sha2_256 => 0x12,
            HashAlgorithm::Blake3 => 0x1e,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, DecodeError> {
        match code {
            0x12 => Ok(HashAlgorithm::Sha2_256),
            0x1e => Ok(HashAlgorithm::Blake3),
            other => Err(DecodeError::UnknownHashAlgorithm(other)),
        }
    }

    pub const fn digest_len(self) -> usize {
        DIGEST_LEN
    }
}

/// Content identifier: equal iff version, content type, algorithm and digest are equal
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid {
    version: u64,
    content_type: ContentType,
    hash_algorithm: HashAlgorithm,
    digest: Digest,
}

impl Cid {
    /// Build a version 1 CID from its parts
    pub fn new(content_type: ContentType, hash_algorithm: HashAlgorithm, digest: Digest) -> Self {
        Self {
            version: CID_VERSION,
            content_type,
            hash_algorithm,
            digest,
        }
    }

    /// Address `data` with the default hash algorithm
    pub fn hash(content_type: ContentType, data: &[u8]) -> Self {
        Self::hash_with(HashAlgorithm::default(), content_type, data)
    }

    /// Address `data` with an explicit hash algorithm
    pub fn hash_with(hash_algorithm: HashAlgorithm, content_type: ContentType, data: &[u8]) -> Self {
        let digest = hasher::compute_digest(hash_algorithm, data);
        Self::new(content_type, hash_algorithm, digest)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// True when `data` hashes to this CID under its own algorithm
    pub fn verify(&self, data: &[u8]) -> bool {
        hasher::compute_digest(self.hash_algorithm, data) == self.digest
    }

    /// Binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + DIGEST_LEN);
        write_varint(self.version, &mut out);
        write_varint(self.content_type.code(), &mut out);
        write_varint(self.hash_algorithm.code(), &mut out);
        write_varint(self.hash_algorithm.digest_len() as u64, &mut out);
        out.extend_from_slice(&self.digest);
        out
    }

    /// Parse the binary form. The input must hold exactly one CID.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut pos = 0;

        let version = read_varint(bytes, &mut pos)?;
        if version != CID_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let content_type = ContentType::from_code(read_varint(bytes, &mut pos)?)?;
        let hash_algorithm = HashAlgorithm::from_code(read_varint(bytes, &mut pos)?)?;

        // Compared as u64 so a huge length cannot wrap into a valid one on 32-bit targets.
        let declared = read_varint(bytes, &mut pos)?;
        if declared != hash_algorithm.digest_len() as u64 {
            return Err(DecodeError::DigestLength {
                expected: hash_algorithm.digest_len(),
                actual: usize::try_from(declared).unwrap_or(usize::MAX),
            });
        }
        let declared = hash_algorithm.digest_len();

        let rest = &bytes[pos..];
        if rest.len() < declared {
            return Err(DecodeError::Truncated);
        }
        if rest.len() > declared {
            return Err(DecodeError::TrailingBytes(rest.len() - declared));
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(rest);

        Ok(Self::new(content_type, hash_algorithm, digest))
    }

    /// Parse the canonical string form
    ///
    /// Rejects other multibase encodings and any string that does not re-encode to
    /// itself, so each CID has exactly one accepted spelling.
    pub fn decode(s: &str) -> Result<Self, DecodeError> {
        let (base, bytes) =
            multibase::decode(s).map_err(|e| DecodeError::Multibase(e.to_string()))?;
        if base != CID_BASE {
            return Err(DecodeError::UnsupportedBase(format!("{:?}", base)));
        }

        let cid = Self::from_bytes(&bytes)?;
        if cid.to_string() != s {
            return Err(DecodeError::NonCanonical);
        }
        Ok(cid)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&multibase::encode(CID_BASE, self.to_bytes()))
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", self)
    }
}

impl FromStr for Cid {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Cid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Cid::decode(&s).map_err(serde::de::Error::custom)
    }
}

fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Unsigned LEB128; rejects overlong and non-minimal encodings
fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<u64, DecodeError> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = *bytes.get(*pos).ok_or(DecodeError::Truncated)?;
        *pos += 1;

        if shift == 63 && byte > 1 {
            return Err(DecodeError::InvalidVarint);
        }
        value |= u64::from(byte & 0x7f) << shift;

        if byte & 0x80 == 0 {
            if byte == 0 && shift > 0 {
                return Err(DecodeError::InvalidVarint);
            }
            return Ok(value);
        }
        shift += 7;
    }
}
