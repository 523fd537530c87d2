//! Manifest parsing and normalization
//!
//! The raw manifest is a JSON document listing, per file, the ordered chunk
//! references that compose it, plus two GUID-keyed side tables (chunk hashes
//! and storage groups). Normalization decodes the blob-encoded integers,
//! re-keys the file list by name, and precomputes each chunk-part's
//! destination offset within its file.
//!
//! [`RawManifest`] and [`Manifest`] are deliberately distinct types: the
//! offset accumulation is not idempotent, so a manifest must be normalized
//! exactly once. `normalize` consumes the raw value to enforce that.

use std::collections::HashMap;

use serde::Deserialize;

use crate::blob::{decode_blob, decode_blob_int};
use crate::error::{Error, Result};

/// All-zero hash value signalling "no hash available"; preserved verbatim,
/// never blob-decoded.
const NO_HASH_SENTINEL: &str = "000000000000000000000000";

/// Raw manifest as found on the wire, before normalization.
///
/// Field names match the JSON document exactly. Integers inside are still in
/// their blob-encoded string form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    /// File list, keyed by array index in the raw form
    #[serde(rename = "FileManifestList")]
    pub file_manifest_list: Vec<RawFileManifest>,
    /// Chunk GUID -> blob-encoded content hash
    #[serde(rename = "ChunkHashList")]
    pub chunk_hash_list: HashMap<String, String>,
    /// Chunk GUID -> decimal-like storage group label
    #[serde(rename = "DataGroupList")]
    pub data_group_list: HashMap<String, String>,
}

/// One file entry of the raw manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFileManifest {
    /// Declared file name; becomes the lookup key after normalization
    #[serde(rename = "Filename")]
    pub filename: String,
    /// Declared whole-file hash (opaque to this library, surfaced in listings)
    #[serde(rename = "FileHash")]
    pub file_hash: String,
    /// Ordered chunk references composing the file
    #[serde(rename = "FileChunkParts")]
    pub file_chunk_parts: Vec<RawChunkPart>,
}

/// One chunk reference of the raw manifest, integers still blob-encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChunkPart {
    /// Chunk GUID, keying the hash and group side tables
    #[serde(rename = "Guid")]
    pub guid: String,
    /// Blob-encoded byte offset within the decompressed chunk payload
    #[serde(rename = "Offset")]
    pub offset: String,
    /// Blob-encoded length of the sub-range belonging to this file
    #[serde(rename = "Size")]
    pub size: String,
}

/// One chunk reference after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPart {
    /// Chunk GUID; identifies the remote chunk object and the cache file
    pub guid: String,
    /// Byte offset within the decompressed chunk payload
    pub offset: u64,
    /// Length of the sub-range belonging to this file
    pub size: u64,
    /// Destination byte offset within the reconstructed file
    pub file_start: u64,
}

/// A file after normalization: computed total size and chunk-parts with
/// resolved destination offsets.
///
/// Part order is significant and fixed: it determined the `file_start`
/// accumulation and defines the byte layout of the reconstructed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// File name (the manifest lookup key)
    pub name: String,
    /// Declared whole-file hash
    pub hash: String,
    /// Total file size, computed as the sum of all part sizes
    pub size: u64,
    /// Ordered chunk-parts composing the file
    pub parts: Vec<ChunkPart>,
}

/// Normalized, query-optimized manifest.
///
/// Immutable once built; constructed exactly once per manifest load and
/// shared read-only across all chunk tasks of a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    files: Vec<FileDescriptor>,
    index: HashMap<String, usize>,
    chunk_hashes: HashMap<String, String>,
    data_groups: HashMap<String, String>,
}

impl Manifest {
    /// Parse manifest JSON bytes and normalize the result.
    ///
    /// Missing top-level keys, blob decode failures, duplicate file names,
    /// and dangling chunk references all surface as
    /// [`Error::MalformedManifest`].
    pub fn parse(bytes: &[u8]) -> Result<Manifest> {
        let raw: RawManifest = serde_json::from_slice(bytes)
            .map_err(|e| Error::MalformedManifest(format!("invalid manifest JSON: {}", e)))?;
        Self::normalize(raw)
    }

    /// Normalize a raw manifest into the indexed lookup form.
    ///
    /// Consumes the raw value: the `file_start`/`size` accumulation would
    /// double-count if run twice, so the raw and normalized shapes are
    /// non-interchangeable by construction.
    pub fn normalize(raw: RawManifest) -> Result<Manifest> {
        // Decode the hash table first so chunk references can be validated
        // against it below. The all-zero sentinel passes through unchanged.
        let mut chunk_hashes = HashMap::with_capacity(raw.chunk_hash_list.len());
        for (guid, blob) in raw.chunk_hash_list {
            let hash = if blob == NO_HASH_SENTINEL {
                blob
            } else {
                decode_blob(&blob, true)?
            };
            chunk_hashes.insert(guid, hash);
        }

        // Group labels are storage-bucket names, not quantities: values 0-9
        // are zero-padded to two digits to match the remote path layout.
        let mut data_groups = HashMap::with_capacity(raw.data_group_list.len());
        for (guid, group) in raw.data_group_list {
            let value: u64 = group.parse().map_err(|_| {
                Error::MalformedManifest(format!(
                    "invalid data group '{}' for chunk {}",
                    group, guid
                ))
            })?;
            data_groups.insert(guid, format!("{:02}", value));
        }

        let mut files = Vec::with_capacity(raw.file_manifest_list.len());
        let mut index = HashMap::with_capacity(raw.file_manifest_list.len());

        for file in raw.file_manifest_list {
            let mut parts = Vec::with_capacity(file.file_chunk_parts.len());
            let mut file_size: u64 = 0;
            let mut file_start: u64 = 0;

            for part in file.file_chunk_parts {
                if !chunk_hashes.contains_key(&part.guid) {
                    return Err(Error::MalformedManifest(format!(
                        "chunk {} referenced by '{}' has no hash entry",
                        part.guid, file.filename
                    )));
                }
                if !data_groups.contains_key(&part.guid) {
                    return Err(Error::MalformedManifest(format!(
                        "chunk {} referenced by '{}' has no data group entry",
                        part.guid, file.filename
                    )));
                }

                let offset = decode_int_field(&part.offset, &part.guid, "Offset")?;
                let size = decode_int_field(&part.size, &part.guid, "Size")?;

                parts.push(ChunkPart {
                    guid: part.guid,
                    offset,
                    size,
                    file_start,
                });

                // Parts pack contiguously in declaration order, independent
                // of each part's offset within its chunk.
                file_start = file_start.checked_add(size).ok_or_else(|| {
                    Error::MalformedManifest(format!(
                        "file '{}' exceeds addressable size",
                        file.filename
                    ))
                })?;
                file_size = file_start;
            }

            if index.contains_key(&file.filename) {
                return Err(Error::MalformedManifest(format!(
                    "duplicate file name '{}' in manifest",
                    file.filename
                )));
            }
            index.insert(file.filename.clone(), files.len());
            files.push(FileDescriptor {
                name: file.filename,
                hash: file.file_hash,
                size: file_size,
                parts,
            });
        }

        Ok(Manifest {
            files,
            index,
            chunk_hashes,
            data_groups,
        })
    }

    /// Files in manifest declaration order.
    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// Look up a file by name.
    pub fn file(&self, name: &str) -> Option<&FileDescriptor> {
        self.index.get(name).map(|&i| &self.files[i])
    }

    /// Uppercase hex content hash for a chunk GUID.
    pub fn chunk_hash(&self, guid: &str) -> Option<&str> {
        self.chunk_hashes.get(guid).map(String::as_str)
    }

    /// Two-digit storage group label for a chunk GUID.
    pub fn data_group(&self, guid: &str) -> Option<&str> {
        self.data_groups.get(guid).map(String::as_str)
    }
}

/// Decode a blob-encoded offset/size field into a `u64`.
fn decode_int_field(blob: &str, guid: &str, field: &str) -> Result<u64> {
    let value = decode_blob_int(blob, true)?;
    u64::try_from(value).map_err(|_| {
        Error::MalformedManifest(format!(
            "{} of chunk {} does not fit 64 bits: {}",
            field, guid, value
        ))
    })
}
