//! Per-file download execution: bounded fan-out over chunk-parts, fan-in via
//! disjoint positional writes.

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::chunk;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest::{ChunkPart, FileDescriptor, Manifest};

use super::ChunkDownloader;
use super::sink::Sink;

impl ChunkDownloader {
    /// Download a file from the manifest into memory.
    ///
    /// Fetches all chunk-parts of `file_name` under the configured
    /// concurrency cap and assembles them into a buffer sized to the file's
    /// total length.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingArgument`] when `file_name` is empty
    /// - [`Error::FileNotFound`] when the manifest has no such file (checked
    ///   before any I/O happens)
    /// - [`Error::ChunkFetch`] when any chunk fetch fails; the whole call
    ///   fails and sibling results are discarded
    pub async fn download(&self, file_name: &str) -> Result<Vec<u8>> {
        let file = self.lookup(file_name)?;
        let sink = Arc::new(Sink::memory(file.size)?);

        self.run(file, &sink).await?;

        Arc::into_inner(sink)
            .and_then(Sink::into_memory)
            .ok_or_else(|| Error::Io(std::io::Error::other("download buffer still shared")))
    }

    /// Download a file from the manifest to `destination` on disk.
    ///
    /// The destination is created (truncating any existing file) and sized to
    /// the file's total length up front; chunk tasks then write their
    /// sub-ranges at the precomputed offsets. On success the file is synced
    /// and closed. There is no partial-success contract: on error the
    /// destination contents are unspecified.
    pub async fn download_to_file(
        &self,
        file_name: &str,
        destination: impl AsRef<Path>,
    ) -> Result<()> {
        let file = self.lookup(file_name)?;
        let destination = destination.as_ref();

        let output = tokio::fs::File::create(destination).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to create '{}': {}", destination.display(), e),
            ))
        })?;
        output.set_len(file.size).await?;
        let sink = Arc::new(Sink::File(output.into_std().await));

        self.run(file, &sink).await?;

        sink.sync()?;
        Ok(())
    }

    /// Resolve a download request to its file descriptor, validating the
    /// arguments before any I/O.
    fn lookup(&self, file_name: &str) -> Result<&FileDescriptor> {
        if file_name.is_empty() {
            return Err(Error::MissingArgument("file_name".to_string()));
        }
        self.manifest
            .file(file_name)
            .ok_or_else(|| Error::FileNotFound(file_name.to_string()))
    }

    /// Fan out over the file's chunk-parts with at most
    /// `max_concurrent_chunks` fetches in flight, waiting for all tasks
    /// before reporting the first error.
    async fn run(&self, file: &FileDescriptor, sink: &Arc<Sink>) -> Result<()> {
        tracing::info!(
            file = %file.name,
            bytes = file.size,
            parts = file.parts.len(),
            "Starting file download"
        );

        let results: Vec<Result<()>> = stream::iter(file.parts.iter().cloned())
            .map(|part| {
                let config = Arc::clone(&self.config);
                let manifest = Arc::clone(&self.manifest);
                let client = self.client.clone();
                let sink = Arc::clone(sink);
                async move { fetch_and_write(part, config, manifest, client, sink).await }
            })
            .buffer_unordered(self.config.max_concurrent_chunks)
            .collect()
            .await;

        for result in results {
            result?;
        }

        tracing::info!(file = %file.name, bytes = file.size, "File download complete");
        Ok(())
    }
}

/// One chunk task: obtain the raw chunk, then decompress, slice, and write
/// the sub-range on a blocking thread so tokio workers keep driving
/// concurrent fetches.
async fn fetch_and_write(
    part: ChunkPart,
    config: Arc<Config>,
    manifest: Arc<Manifest>,
    client: reqwest::Client,
    sink: Arc<Sink>,
) -> Result<()> {
    let raw = chunk::obtain_chunk(&client, &config, &manifest, &part.guid).await?;

    let guid = part.guid.clone();
    tokio::task::spawn_blocking(move || {
        let payload =
            chunk::decompress_chunk(&raw).map_err(|m| Error::chunk_fetch(&part.guid, m))?;
        let range = chunk::extract_range(&payload, part.offset, part.size)
            .map_err(|m| Error::chunk_fetch(&part.guid, m))?;
        sink.write_at(range, part.file_start).map_err(Error::Io)
    })
    .await
    .map_err(|e| Error::chunk_fetch(&guid, format!("decode task panicked: {}", e)))?
}
