//! # chunk-dl
//!
//! Library for reconstructing large files from a remote content-addressed
//! chunk store, driven by a manifest that maps each file to the ordered chunk
//! sub-ranges composing it.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Explicit configuration** - Every recognized option is a typed field
//!   with a default, validated eagerly at start
//! - **Started-by-construction** - [`ChunkDownloader::start`] is the only
//!   constructor, so there is no "not started" state to misuse
//! - **Bounded concurrency** - Chunk fetches fan out under a configurable cap
//!   and fan in through disjoint positional writes
//!
//! ## Quick Start
//!
//! ```no_run
//! use chunk_dl::{ChunkDownloader, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ChunkDownloader::start(Config {
//!         server_path: "/Builds/UnrealEngineLauncher/CloudDir/ChunksV3".to_string(),
//!         manifest: Some(std::path::PathBuf::from("app.manifest").into()),
//!         chunks_folder: Some("./chunk-cache".into()),
//!         save_chunks: true,
//!         ..Default::default()
//!     })
//!     .await?;
//!
//!     // In-memory reassembly
//!     let bytes = downloader.download("Engine/Binaries/Setup.exe").await?;
//!     println!("downloaded {} bytes", bytes.len());
//!
//!     // Or straight to disk
//!     downloader
//!         .download_to_file("Engine/Binaries/Setup.exe", "Setup.exe")
//!         .await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Manifest blob decoding (triplet-digit-group integers and hashes)
pub mod blob;
/// Chunk fetching, caching, and payload decoding
mod chunk;
/// Configuration types
pub mod config;
/// Core downloader implementation
pub mod downloader;
/// Error types
pub mod error;
/// Manifest parsing and normalization
pub mod manifest;

// Re-export commonly used types
pub use config::{Config, ManifestSource};
pub use downloader::{ChunkDownloader, FileEntry};
pub use error::{Error, Result};
pub use manifest::{ChunkPart, FileDescriptor, Manifest, RawManifest};
