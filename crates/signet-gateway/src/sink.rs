//! Attestation sinks.
//!
//! A sink durably stores one signed envelope. Sinks are independently
//! fallible: the pipeline attempts every configured sink regardless of
//! earlier failures and reports the worst outcome.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use signet_attestation::{content_address, Envelope};

use crate::error::GatewayError;

/// Errors from storing an envelope in one sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The archive request could not be sent or completed.
    #[error("archive request failed: {source}")]
    Http {
        /// Underlying transport error.
        #[from]
        source: reqwest::Error,
    },

    /// The archive answered with a non-success status.
    #[error("archive rejected envelope with status {status}")]
    Rejected {
        /// HTTP status returned by the archive.
        status: u16,
    },

    /// The envelope could not be serialized for storage.
    #[error("could not serialize envelope: {source}")]
    Serialize {
        /// Underlying serialization error.
        #[from]
        source: signet_attestation::SignError,
    },

    /// The local file could not be written.
    #[error("could not write attestation to {path}: {source}")]
    Write {
        /// Target file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Destination that durably stores signed envelopes.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short sink name for logs.
    fn name(&self) -> &'static str;

    /// Stores one envelope and returns where it landed: a content
    /// address for the archive, a file path for the local directory.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`]; the caller treats failures as isolated to
    /// this sink.
    async fn store(&self, envelope: &Envelope) -> Result<String, SinkError>;
}

/// Remote attestation archive over HTTP.
///
/// Thin adapter around the archive's upload endpoint; transport and
/// storage semantics belong to the archive service.
#[derive(Debug, Clone)]
pub struct ArchiveSink {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    gitoid: String,
}

impl ArchiveSink {
    /// Builds an archive sink for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ArchiveClient` if the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Sink for ArchiveSink {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn store(&self, envelope: &Envelope) -> Result<String, SinkError> {
        let url = format!("{}/upload", self.base_url);
        let response = self.client.post(&url).json(envelope).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
            });
        }

        let upload: UploadResponse = response.json().await?;
        Ok(upload.gitoid)
    }
}

/// Content-addressed local directory sink.
///
/// Filenames are derived from the digest of the serialized envelope, so
/// storing the same envelope twice lands on the same path and the second
/// write is a no-op rather than an error.
#[derive(Debug, Clone)]
pub struct LocalDirSink {
    dir: PathBuf,
}

impl LocalDirSink {
    /// Builds the sink after probing the directory for write access.
    ///
    /// The probe creates and removes a scoped temporary file once at
    /// startup; per-write checks would only duplicate the error path.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::UnwritableDirectory` when the probe fails.
    pub fn new(dir: PathBuf) -> Result<Self, GatewayError> {
        tempfile::NamedTempFile::new_in(&dir).map_err(|source| {
            GatewayError::UnwritableDirectory {
                path: dir.display().to_string(),
                source,
            }
        })?;

        Ok(Self { dir })
    }
}

#[async_trait]
impl Sink for LocalDirSink {
    fn name(&self) -> &'static str {
        "local-directory"
    }

    async fn store(&self, envelope: &Envelope) -> Result<String, SinkError> {
        let bytes = envelope.to_bytes()?;
        let address = content_address(&bytes);
        let path = self.dir.join(format!("{address}.json"));
        let path_str = path.display().to_string();

        match tokio::fs::try_exists(&path).await {
            Ok(true) => {
                debug!(path = %path_str, "attestation already stored");
                return Ok(path_str);
            },
            Ok(false) => {},
            Err(source) => {
                return Err(SinkError::Write {
                    path: path_str,
                    source,
                })
            },
        }

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| SinkError::Write {
                path: path_str.clone(),
                source,
            })?;

        Ok(path_str)
    }
}
