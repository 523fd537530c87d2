//! Chunk fetching and payload decoding
//!
//! A chunk object as stored on the remote chunk store is a short header
//! followed by a zlib-compressed (or occasionally raw) payload. This module
//! resolves a chunk's storage path, obtains its bytes from the local cache or
//! the network, strips the header, and inflates the payload.

use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest::Manifest;

/// Signature byte found at [`SIGNATURE_INDEX`] when the chunk carries the
/// fixed 8-byte header: 0x78, the zlib CMF byte opening the deflate stream.
const ZLIB_SIGNATURE: u8 = 120;

/// Byte index of the header signature within the chunk object.
const SIGNATURE_INDEX: usize = 8;

/// Header length when the signature byte is [`ZLIB_SIGNATURE`].
const FIXED_HEADER_LEN: usize = 8;

/// Build the store-relative path of a chunk object.
///
/// `server_path` is expected to already carry leading and trailing slashes
/// (normalized at start time).
pub(crate) fn chunk_url_path(server_path: &str, group: &str, hash: &str, guid: &str) -> String {
    format!("{}{}/{}_{}.chunk", server_path, group, hash, guid)
}

/// Local cache file path for a chunk GUID.
pub(crate) fn cache_path(chunks_folder: &Path, guid: &str) -> PathBuf {
    chunks_folder.join(format!("{}.chunk", guid))
}

/// Strip the chunk header and inflate the payload.
///
/// The header-stripping rule is reverse-engineered from observed chunk
/// objects: the byte at index 8 is either the zlib signature (0x78, meaning a
/// fixed 8-byte header precedes the compressed stream) or the length of a
/// variable header. There is no documented specification for this layout;
/// the rule is preserved exactly as observed.
///
/// If inflation fails the stripped bytes are returned unchanged -- some chunk
/// payloads are stored uncompressed and that is not an error.
pub(crate) fn decompress_chunk(data: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let signature = *data
        .get(SIGNATURE_INDEX)
        .ok_or_else(|| format!("chunk of {} bytes is shorter than its header", data.len()))?;

    let header_len = if signature == ZLIB_SIGNATURE {
        FIXED_HEADER_LEN
    } else {
        signature as usize
    };

    let body = data.get(header_len..).ok_or_else(|| {
        format!(
            "chunk header length {} exceeds chunk size {}",
            header_len,
            data.len()
        )
    })?;

    let mut payload = Vec::new();
    match ZlibDecoder::new(body).read_to_end(&mut payload) {
        Ok(_) => Ok(payload),
        // Not a zlib stream: the payload was never compressed
        Err(_) => Ok(body.to_vec()),
    }
}

/// Slice the sub-range of a decompressed payload that belongs to one file.
pub(crate) fn extract_range(payload: &[u8], offset: u64, size: u64) -> std::result::Result<&[u8], String> {
    let start = usize::try_from(offset).map_err(|_| format!("range offset {} overflows", offset))?;
    let end = start
        .checked_add(usize::try_from(size).map_err(|_| format!("range size {} overflows", size))?)
        .ok_or_else(|| format!("range [{}, {}+{}) overflows", offset, offset, size))?;
    payload.get(start..end).ok_or_else(|| {
        format!(
            "range [{}, {}) exceeds decompressed payload of {} bytes",
            start,
            end,
            payload.len()
        )
    })
}

/// Obtain the raw (pre-decompression) bytes of one chunk object.
///
/// Order of precedence: local cache read (when configured), then network
/// fetch, then best-effort cache write-back (when persistence is enabled and
/// the chunk did not come from the cache). Cache failures in either direction
/// never fail the fetch; the network is the fallback of record.
pub(crate) async fn obtain_chunk(
    client: &reqwest::Client,
    config: &Config,
    manifest: &Manifest,
    guid: &str,
) -> Result<Vec<u8>> {
    let group = manifest
        .data_group(guid)
        .ok_or_else(|| Error::MalformedManifest(format!("chunk {} has no data group entry", guid)))?;
    let hash = manifest
        .chunk_hash(guid)
        .ok_or_else(|| Error::MalformedManifest(format!("chunk {} has no hash entry", guid)))?;

    let url_path = chunk_url_path(&config.server_path, group, hash, guid);
    if config.debug_log {
        tracing::info!(guid = %guid, path = %url_path, "Resolved chunk URL");
    } else {
        tracing::debug!(guid = %guid, path = %url_path, "Resolved chunk URL");
    }

    if let Some(folder) = &config.chunks_folder
        && let Some(bytes) = read_cached(folder, guid).await
    {
        return Ok(bytes);
    }

    let bytes = fetch_over_network(client, &config.host, &url_path, guid).await?;

    if let Some(folder) = &config.chunks_folder
        && config.save_chunks
    {
        write_back(folder, guid, &bytes).await;
    }

    Ok(bytes)
}

/// Try to read a chunk from the local cache.
///
/// Absence and read failures are recognized non-exceptional outcomes: both
/// return `None` and the caller falls through to the network.
async fn read_cached(folder: &Path, guid: &str) -> Option<Vec<u8>> {
    let path = cache_path(folder, guid);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            tracing::debug!(guid = %guid, bytes = bytes.len(), "Chunk served from cache");
            Some(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!(guid = %guid, path = %path.display(), error = %e, "Cache read failed, falling back to network");
            None
        }
    }
}

/// Fetch a chunk object over HTTP.
///
/// Any transport error or non-2xx status fails the chunk fetch, which is
/// fatal to the enclosing download. Retries, if desired, are the caller's
/// responsibility.
async fn fetch_over_network(
    client: &reqwest::Client,
    host: &str,
    url_path: &str,
    guid: &str,
) -> Result<Vec<u8>> {
    let url = format!("http://{}{}", host, url_path);

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| Error::chunk_fetch(guid, format!("request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::chunk_fetch(guid, format!("HTTP status {}", status)));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::chunk_fetch(guid, format!("failed to read response body: {}", e)))?;

    tracing::debug!(guid = %guid, bytes = bytes.len(), "Chunk fetched from network");
    Ok(bytes.to_vec())
}

/// Persist freshly fetched chunk bytes into the cache, best-effort.
async fn write_back(folder: &Path, guid: &str, bytes: &[u8]) {
    let path = cache_path(folder, guid);
    if let Err(e) = tokio::fs::write(&path, bytes).await {
        tracing::warn!(guid = %guid, path = %path.display(), error = %e, "Failed to persist chunk to cache");
    }
}
