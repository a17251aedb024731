//! JSON bodies exchanged with a remote blob server

use crate::cid::ContentType;
use serde::{Deserialize, Serialize};

/// `POST /api/get` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetRequest {
    pub root: String,
    #[serde(default)]
    pub path: String,
}

/// `POST /api/get` response body for a present blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetResponse {
    #[serde(default, with = "base64_bytes")]
    pub content: Vec<u8>,
}

/// Kind of blob in an update, as the server names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobType {
    File,
    Directory,
}

impl From<ContentType> for BlobType {
    fn from(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Raw => BlobType::File,
            ContentType::Tree => BlobType::Directory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Blob {
    #[serde(rename = "Type")]
    pub kind: BlobType,
    #[serde(default)]
    pub path: String,
    #[serde(default, with = "base64_bytes")]
    pub content: Vec<u8>,
}

/// `POST /api/update` request. An empty root with an empty path uploads standalone blobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub root: String,
    pub blobs: Vec<Blob>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateResponse {
    pub root: String,
}

/// Byte fields travel as standard base64 strings; `null` reads as empty
mod base64_bytes {
    use base64::prelude::BASE64_STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => BASE64_STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
