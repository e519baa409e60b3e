//! Serialization of fitted models.
//!
//! Fitted state is plain serde data (no handles, no caches), encoded with
//! bincode. A model file wraps the bincode payload in a small envelope:
//!
//! ```text
//! +----------+----------------+------------------+
//! | CREBENCH | version u32 LE | bincode payload  |
//! +----------+----------------+------------------+
//! ```
//!
//! Files are written to a sibling temporary file first and renamed into
//! place, so a reader never observes a partially written model.

use crate::error::{Error, Result};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Leading bytes of every model file.
pub const MAGIC: &[u8; 8] = b"CREBENCH";

/// Current envelope format version.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = MAGIC.len() + 4;

/// Wrap a serialized payload in the versioned envelope.
pub fn encode_envelope<T: Serialize>(payload: &T) -> Result<Vec<u8>> {
    let body = bincode::serialize(payload)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Check the envelope and decode its payload.
///
/// The payload must decode exactly: trailing bytes are an error, and no
/// length prefix may claim more bytes than the payload holds.
///
/// # Errors
/// `Persistence` on a wrong magic, an unsupported version or a payload that
/// does not decode.
pub fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::Persistence(format!(
            "file too short for a model header ({} bytes)",
            bytes.len()
        )));
    }
    let (magic, rest) = bytes.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(Error::Persistence("not a model file (bad magic)".to_string()));
    }
    let (version, body) = rest.split_at(4);
    let mut raw = [0u8; 4];
    raw.copy_from_slice(version);
    let version = u32::from_le_bytes(raw);
    if version != FORMAT_VERSION {
        return Err(Error::Persistence(format!(
            "unsupported model format version {version} (expected {FORMAT_VERSION})"
        )));
    }
    let payload = bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(body.len() as u64)
        .deserialize(body)?;
    Ok(payload)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `bytes` to `path` through a temporary file and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    let written = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

/// Encode `payload` and write it atomically to `path`.
pub fn save_envelope<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    write_atomic(path, &encode_envelope(payload)?)
}

/// Read and decode a model file.
pub fn load_envelope<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    decode_envelope(&bytes)
}
