//! Manifest blob decoding
//!
//! Integers and content hashes inside the manifest are stored as strings of
//! 3-digit decimal groups, one group per byte, least-significant group first.
//! This module converts those blobs into uppercase hex strings (hash form) or
//! unsigned integers (offset/size form). Pure and deterministic; no I/O.

use crate::error::{Error, Result};

/// Number of decimal digits per encoded byte.
const GROUP_LEN: usize = 3;

/// Split a blob into consecutive [`GROUP_LEN`]-character groups and parse each
/// group as one byte value.
///
/// The final group may be shorter than [`GROUP_LEN`] when the blob length is
/// not a multiple of three; it is parsed as-is rather than rejected. When
/// `reverse_groups` is set, group order is reversed before conversion (the
/// encoding stores groups least-significant-first).
///
/// A group whose decimal value does not fit a byte indicates a corrupt blob
/// and fails with [`Error::MalformedManifest`] rather than truncating.
fn blob_bytes(blob: &str, reverse_groups: bool) -> Result<Vec<u8>> {
    let groups: Vec<&str> = blob
        .as_bytes()
        .chunks(GROUP_LEN)
        .map(|chunk| {
            // Blobs are ASCII decimal digits; a multi-byte UTF-8 sequence can
            // only produce an invalid group, caught by the parse below.
            std::str::from_utf8(chunk).unwrap_or("")
        })
        .collect();

    let ordered: Box<dyn Iterator<Item = &&str>> = if reverse_groups {
        Box::new(groups.iter().rev())
    } else {
        Box::new(groups.iter())
    };

    let mut bytes = Vec::with_capacity(groups.len());
    for group in ordered {
        let value: u16 = group.parse().map_err(|_| {
            Error::MalformedManifest(format!("invalid blob group '{}' in '{}'", group, blob))
        })?;
        if value > u8::MAX as u16 {
            return Err(Error::MalformedManifest(format!(
                "blob group '{}' exceeds byte range in '{}'",
                group, blob
            )));
        }
        bytes.push(value as u8);
    }

    Ok(bytes)
}

/// Decode a blob into its uppercase hexadecimal byte string.
///
/// This is the hash form: each 3-digit decimal group becomes one 2-digit hex
/// byte, concatenated in (optionally reversed) group order.
///
/// # Examples
///
/// ```
/// use chunk_dl::blob::decode_blob;
///
/// // groups "171" and "205" -> bytes 0xAB, 0xCD, reversed
/// assert_eq!(decode_blob("171205", true).unwrap(), "CDAB");
/// assert_eq!(decode_blob("171205", false).unwrap(), "ABCD");
/// ```
pub fn decode_blob(blob: &str, reverse_groups: bool) -> Result<String> {
    let bytes = blob_bytes(blob, reverse_groups)?;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{:02X}", byte));
    }
    Ok(out)
}

/// Decode a blob into an unsigned integer.
///
/// This is the offset/size form: the decoded byte sequence is interpreted as
/// a big-endian unsigned integer. `u128` covers the full range of hash-like
/// values (24 hex digits = 96 bits), which exceed native 64-bit integers.
///
/// # Examples
///
/// ```
/// use chunk_dl::blob::decode_blob_int;
///
/// // 256 encodes as byte 0x01 then 0x00, stored least-significant-first
/// assert_eq!(decode_blob_int("000001", true).unwrap(), 256);
/// ```
pub fn decode_blob_int(blob: &str, reverse_groups: bool) -> Result<u128> {
    let bytes = blob_bytes(blob, reverse_groups)?;
    let mut value: u128 = 0;
    for byte in bytes {
        value = value
            .checked_mul(256)
            .and_then(|v| v.checked_add(byte as u128))
            .ok_or_else(|| {
                Error::MalformedManifest(format!("blob '{}' overflows 128 bits", blob))
            })?;
    }
    Ok(value)
}
