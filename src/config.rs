//! Configuration types for chunk-dl

use std::path::PathBuf;

/// Default chunk store host.
fn default_host() -> String {
    "download.epicgames.com".to_string()
}

/// Default number of chunk fetches in flight per download.
fn default_max_concurrent_chunks() -> usize {
    4
}

/// Where the manifest comes from: an in-memory buffer or a file on disk.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    /// Manifest JSON already held in memory
    Bytes(Vec<u8>),
    /// Path to a manifest JSON file, read at start time
    Path(PathBuf),
}

impl From<Vec<u8>> for ManifestSource {
    fn from(bytes: Vec<u8>) -> Self {
        ManifestSource::Bytes(bytes)
    }
}

impl From<PathBuf> for ManifestSource {
    fn from(path: PathBuf) -> Self {
        ManifestSource::Path(path)
    }
}

/// Downloader configuration
///
/// Every recognized option is an explicit field with its default; validation
/// happens eagerly in [`ChunkDownloader::start`](crate::ChunkDownloader::start),
/// which consumes the config and returns the started handle.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chunk store host, optionally with a port (default: `download.epicgames.com`)
    pub host: String,

    /// Server download path where chunks live, e.g.
    /// `/Builds/UnrealEngineLauncher/CloudDir/ChunksV3` (required; normalized
    /// to a leading and trailing slash at start time)
    pub server_path: String,

    /// Manifest source (required)
    pub manifest: Option<ManifestSource>,

    /// Local chunk cache directory; when set, chunks found there skip the
    /// network fetch. Must already exist and be a directory.
    pub chunks_folder: Option<PathBuf>,

    /// Persist fetched chunks into `chunks_folder` (requires `chunks_folder`)
    pub save_chunks: bool,

    /// Maximum number of chunk fetches in flight per download (default: 4)
    pub max_concurrent_chunks: usize,

    /// Log the resolved chunk URL of every fetch at info level instead of debug
    pub debug_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            server_path: String::new(),
            manifest: None,
            chunks_folder: None,
            save_chunks: false,
            max_concurrent_chunks: default_max_concurrent_chunks(),
            debug_log: false,
        }
    }
}
