//! Manifest and chunk object builders for integration tests.

use std::collections::HashMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Server path used by all test configs (pre-normalization form).
pub const SERVER_PATH: &str = "/CloudDir/ChunksV3";

/// Encode an integer into the manifest's triplet-group storage form
/// (one 3-digit decimal group per byte, least-significant first).
pub fn int_blob(mut value: u64) -> String {
    let mut out = String::new();
    loop {
        out.push_str(&format!("{:03}", value % 256));
        value /= 256;
        if value == 0 {
            break;
        }
    }
    out
}

/// Encode a byte sequence into a blob whose decoded hex form equals the
/// uppercase hex of `bytes` in order.
pub fn hash_blob(bytes: &[u8]) -> String {
    // The decoder reverses group order, so storage order is reversed
    bytes.iter().rev().map(|b| format!("{:03}", b)).collect()
}

/// Uppercase hex rendering of a byte sequence.
pub fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Wrap a payload into a chunk object: fixed 8-byte header followed by a
/// zlib-compressed stream (whose first byte is the 0x78 signature).
pub fn compressed_chunk(payload: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).unwrap();
    let stream = encoder.finish().unwrap();
    assert_eq!(stream[0], 120, "zlib stream must open with the 0x78 signature");

    let mut chunk = vec![0u8; 8];
    chunk.extend_from_slice(&stream);
    chunk
}

/// Wrap a payload into an uncompressed chunk object with a variable-length
/// header announced by the signature byte at index 8.
pub fn uncompressed_chunk(header_len: u8, payload: &[u8]) -> Vec<u8> {
    assert!(header_len > 8, "signature byte lives at index 8");
    let mut chunk = vec![0u8; header_len as usize];
    chunk[8] = header_len;
    chunk.extend_from_slice(payload);
    chunk
}

/// One remote chunk as the tests see it: identity, storage location, and
/// decompressed payload.
pub struct TestChunk {
    pub guid: &'static str,
    pub group: u64,
    pub hash_bytes: Vec<u8>,
    pub payload: Vec<u8>,
}

impl TestChunk {
    pub fn new(guid: &'static str, group: u64, hash_seed: u8, payload: Vec<u8>) -> Self {
        TestChunk {
            guid,
            group,
            hash_bytes: vec![hash_seed; 12],
            payload,
        }
    }

    /// Uppercase hex hash as it appears in the normalized manifest.
    pub fn hash_hex(&self) -> String {
        hex_upper(&self.hash_bytes)
    }

    /// Store-relative URL path of this chunk object.
    pub fn url_path(&self) -> String {
        format!(
            "{}/{:02}/{}_{}.chunk",
            SERVER_PATH,
            self.group,
            self.hash_hex(),
            self.guid
        )
    }

    /// The chunk object bytes as served by the store.
    pub fn body(&self) -> Vec<u8> {
        compressed_chunk(&self.payload)
    }
}

/// Build manifest JSON for the given files, each a list of
/// `(chunk, offset, size)` sub-range references.
pub fn manifest_json(files: &[(&str, Vec<(&TestChunk, u64, u64)>)]) -> Vec<u8> {
    let mut chunk_hash_list = HashMap::new();
    let mut data_group_list = HashMap::new();

    let file_list: Vec<serde_json::Value> = files
        .iter()
        .map(|(name, parts)| {
            let chunk_parts: Vec<serde_json::Value> = parts
                .iter()
                .map(|(chunk, offset, size)| {
                    chunk_hash_list.insert(chunk.guid.to_string(), hash_blob(&chunk.hash_bytes));
                    data_group_list.insert(chunk.guid.to_string(), chunk.group.to_string());
                    serde_json::json!({
                        "Guid": chunk.guid,
                        "Offset": int_blob(*offset),
                        "Size": int_blob(*size),
                    })
                })
                .collect();
            serde_json::json!({
                "Filename": name,
                "FileHash": format!("filehash-{}", name),
                "FileChunkParts": chunk_parts,
            })
        })
        .collect();

    serde_json::to_vec(&serde_json::json!({
        "FileManifestList": file_list,
        "ChunkHashList": chunk_hash_list,
        "DataGroupList": data_group_list,
    }))
    .unwrap()
}

/// Base config for a wiremock-backed downloader. `server_uri` is the mock
/// server's `uri()`, e.g. `http://127.0.0.1:4321`.
pub fn wiremock_config(server_uri: &str, manifest: Vec<u8>) -> chunk_dl::Config {
    let host = server_uri
        .strip_prefix("http://")
        .unwrap_or(server_uri)
        .to_string();
    chunk_dl::Config {
        host,
        server_path: SERVER_PATH.to_string(),
        manifest: Some(manifest.into()),
        ..Default::default()
    }
}
