//! Download orchestrator.
//!
//! [`ChunkDownloader`] is the stateful front door of the library. It is
//! constructed by [`ChunkDownloader::start`], which validates the
//! configuration, loads and normalizes the manifest, and returns a started
//! handle -- there is no unstarted downloader value, so "operation before
//! start" is unrepresentable rather than a runtime check.
//!
//! Submodules:
//! - [`download`] - per-file fan-out over chunk-parts and sink writes
//! - [`sink`] - positional-write output sinks (memory buffer / pre-sized file)

mod download;
mod sink;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use crate::config::{Config, ManifestSource};
use crate::error::{Error, Result};
use crate::manifest::Manifest;

/// A file listing entry with its declared hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name (the manifest lookup key)
    pub name: String,
    /// Declared whole-file hash
    pub hash: String,
}

/// Started downloader handle (cloneable - all fields are cheap to share).
///
/// Owns an immutable configuration and the normalized manifest for the
/// lifetime of the instance. Reconfiguration is not supported: a fresh
/// instance is required per manifest.
#[derive(Clone)]
pub struct ChunkDownloader {
    /// Validated configuration, immutable after start
    pub(crate) config: Arc<Config>,
    /// Normalized manifest, read-only shared state across all chunk tasks
    pub(crate) manifest: Arc<Manifest>,
    /// HTTP client for chunk store fetches
    pub(crate) client: reqwest::Client,
}

impl ChunkDownloader {
    /// Validate the configuration, load the manifest, and return a started
    /// downloader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when:
    /// - `server_path` or `manifest` is missing
    /// - `save_chunks` is set without a `chunks_folder`
    /// - `chunks_folder` does not exist or is not a directory
    /// - `max_concurrent_chunks` is zero
    ///
    /// Returns [`Error::MalformedManifest`] when the manifest fails to parse
    /// or normalize, and [`Error::Io`] when a manifest file cannot be read.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chunk_dl::{ChunkDownloader, Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = ChunkDownloader::start(Config {
    ///         server_path: "/Builds/Fortnite/CloudDir/ChunksV3".to_string(),
    ///         manifest: Some(std::path::PathBuf::from("app.manifest").into()),
    ///         ..Default::default()
    ///     })
    ///     .await?;
    ///
    ///     for name in downloader.list_files() {
    ///         println!("{}", name);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn start(mut config: Config) -> Result<ChunkDownloader> {
        if config.server_path.is_empty() {
            return Err(Error::config("server_path is missing", "server_path"));
        }
        if !config.server_path.starts_with('/') {
            config.server_path.insert(0, '/');
        }
        if !config.server_path.ends_with('/') {
            config.server_path.push('/');
        }

        let source = config
            .manifest
            .take()
            .ok_or_else(|| Error::config("manifest is missing", "manifest"))?;

        if config.save_chunks && config.chunks_folder.is_none() {
            return Err(Error::config(
                "save_chunks requires a chunks_folder",
                "save_chunks",
            ));
        }

        if let Some(folder) = &config.chunks_folder {
            let metadata = tokio::fs::metadata(folder).await.map_err(|e| {
                Error::config(
                    format!("chunks_folder '{}' is invalid: {}", folder.display(), e),
                    "chunks_folder",
                )
            })?;
            if !metadata.is_dir() {
                return Err(Error::config(
                    format!("chunks_folder '{}' is not a directory", folder.display()),
                    "chunks_folder",
                ));
            }
        }

        if config.max_concurrent_chunks == 0 {
            return Err(Error::config(
                "max_concurrent_chunks must be at least 1",
                "max_concurrent_chunks",
            ));
        }

        let manifest_bytes = match source {
            ManifestSource::Bytes(bytes) => bytes,
            ManifestSource::Path(path) => tokio::fs::read(&path).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to read manifest file '{}': {}", path.display(), e),
                ))
            })?,
        };

        let manifest = Manifest::parse(&manifest_bytes)?;

        let client = reqwest::Client::builder().build().map_err(|e| Error::Config {
            message: format!("failed to create HTTP client: {}", e),
            key: None,
        })?;

        tracing::info!(
            files = manifest.files().len(),
            server_path = %config.server_path,
            host = %config.host,
            "Chunk downloader started"
        );

        Ok(ChunkDownloader {
            config: Arc::new(config),
            manifest: Arc::new(manifest),
            client,
        })
    }

    /// File names in manifest declaration order.
    pub fn list_files(&self) -> Vec<String> {
        self.manifest
            .files()
            .iter()
            .map(|file| file.name.clone())
            .collect()
    }

    /// File names with their declared hashes, in manifest declaration order.
    pub fn list_files_with_hash(&self) -> Vec<FileEntry> {
        self.manifest
            .files()
            .iter()
            .map(|file| FileEntry {
                name: file.name.clone(),
                hash: file.hash.clone(),
            })
            .collect()
    }

    /// The normalized manifest this downloader serves from.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}
