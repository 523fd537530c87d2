//! Shared helpers for downloader unit tests.

use crate::config::Config;

/// Encode a small integer into the manifest's triplet-group storage form.
pub(crate) fn int_blob(mut value: u64) -> String {
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

/// Manifest JSON with two files:
/// - `game.pak`: chunks `chunk-a` (100 bytes) and `chunk-b` (50 bytes)
/// - `readme.txt`: chunk `chunk-a` again, different sub-range (25 bytes at offset 10)
pub(crate) fn manifest_json() -> Vec<u8> {
    let json = serde_json::json!({
        "FileManifestList": [
            {
                "Filename": "game.pak",
                "FileHash": "hash-game",
                "FileChunkParts": [
                    { "Guid": "chunk-a", "Offset": int_blob(0), "Size": int_blob(100) },
                    { "Guid": "chunk-b", "Offset": int_blob(0), "Size": int_blob(50) },
                ],
            },
            {
                "Filename": "readme.txt",
                "FileHash": "hash-readme",
                "FileChunkParts": [
                    { "Guid": "chunk-a", "Offset": int_blob(10), "Size": int_blob(25) },
                ],
            },
        ],
        "ChunkHashList": {
            "chunk-a": int_blob(0xAAAA),
            "chunk-b": int_blob(0xBBBB),
        },
        "DataGroupList": {
            "chunk-a": "1",
            "chunk-b": "2",
        },
    });
    serde_json::to_vec(&json).unwrap()
}

/// A config pointing at the in-memory test manifest, network never reached.
pub(crate) fn test_config() -> Config {
    Config {
        server_path: "/CloudDir/ChunksV3".to_string(),
        manifest: Some(manifest_json().into()),
        ..Default::default()
    }
}
