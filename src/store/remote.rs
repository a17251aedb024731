//! Blob store proxied over the HTTP API of a remote server

use crate::cid::Cid;
use crate::error::StorageError;
use crate::store::wire::{Blob, BlobType, GetRequest, GetResponse, UpdateRequest, UpdateResponse};
use crate::store::{decode_verified, BlobStore};
use crate::tree::node::Node;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, error, instrument};

const REMOTE_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REMOTE_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

fn map_http_error(error: reqwest::Error) -> StorageError {
    if error.is_timeout() {
        StorageError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        StorageError::Transport(format!("Connection error: {}", error))
    } else if error.is_decode() {
        StorageError::Transport(format!("Malformed response body: {}", error))
    } else {
        StorageError::Transport(format!("HTTP error: {}", error))
    }
}

fn build_remote_http_client() -> Result<Client, StorageError> {
    Client::builder()
        .no_proxy()
        .connect_timeout(REMOTE_HTTP_CONNECT_TIMEOUT)
        .timeout(REMOTE_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| StorageError::Transport(format!("Failed to create HTTP client: {}", e)))
}

/// `host:port` gets an `http://` scheme; full URLs are kept. Trailing slashes are dropped.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Remote implementation of BlobStore
///
/// The HTTP client is async; each call is driven to completion on a runtime owned by the
/// store, so callers stay synchronous. Do not call it from inside another tokio runtime.
pub struct RemoteStore {
    client: Client,
    base_url: String,
    runtime: Runtime,
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl RemoteStore {
    pub fn new(url: &str) -> Result<Self, StorageError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StorageError::io("Failed to create async runtime", e))?;

        Ok(Self {
            client: build_remote_http_client()?,
            base_url: normalize_base_url(url),
            runtime,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{}", self.base_url, name)
    }

    /// Content for `cid`, or `None` when the server answers 404
    fn fetch(&self, cid: &Cid) -> Result<Option<Vec<u8>>, StorageError> {
        let url = self.endpoint("get");
        let request = GetRequest {
            root: cid.to_string(),
            path: String::new(),
        };

        self.runtime.block_on(async {
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(map_http_error)?;

            match response.status() {
                StatusCode::OK => {
                    let body: GetResponse = response.json().await.map_err(map_http_error)?;
                    Ok(Some(body.content))
                }
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(StorageError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.clone(),
                }),
            }
        })
    }

    fn upload(&self, blob: Blob) -> Result<String, StorageError> {
        let url = self.endpoint("update");
        let request = UpdateRequest {
            root: String::new(),
            blobs: vec![blob],
        };

        self.runtime.block_on(async {
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(map_http_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(StorageError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.clone(),
                });
            }
            let body: UpdateResponse = response.json().await.map_err(map_http_error)?;
            Ok(body.root)
        })
    }
}

impl BlobStore for RemoteStore {
    #[instrument(skip(self), fields(remote = %self.base_url))]
    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        let present = self.fetch(cid)?.is_some();
        debug!(cid = %cid, present, "Remote existence check");
        Ok(present)
    }

    #[instrument(skip(self), fields(remote = %self.base_url))]
    fn get(&self, cid: &Cid) -> Result<Node, StorageError> {
        match self.fetch(cid)? {
            Some(bytes) => decode_verified(cid, bytes),
            None => Err(StorageError::NotFound(*cid)),
        }
    }

    #[instrument(skip(self, node), fields(remote = %self.base_url))]
    fn add(&self, node: &Node) -> Result<Cid, StorageError> {
        let bytes = node.encode();
        let local = Cid::hash(node.content_type(), &bytes);

        let remote = self.upload(Blob {
            kind: BlobType::from(node.content_type()),
            path: String::new(),
            content: bytes.into_owned(),
        })?;

        if remote != local.to_string() {
            error!(local = %local, remote = %remote, "Remote returned a different CID");
            return Err(StorageError::Integrity {
                expected: local.to_string(),
                actual: remote,
            });
        }

        debug!(cid = %local, "Uploaded blob");
        Ok(local)
    }
}
