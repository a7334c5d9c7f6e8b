//! crates/sd_io/src/hasher.rs
//!
//! SHA-256 over raw input bytes. Digests are lowercase hex. Used to echo what
//! was loaded and to verify manifest-declared `inputs_sha256`.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::{IoError, IoResult};

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over a reader stream.
pub fn sha256_stream<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 256 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 of a file's raw bytes.
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let f = File::open(path).map_err(|e| IoError::Read(format!("{}: {e}", path.display())))?;
    let mut r = BufReader::new(f);
    sha256_stream(&mut r).map_err(|e| IoError::Read(format!("{}: {e}", path.display())))
}

/// Lowercase 64-hex shape check.
#[inline]
pub fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Compare a computed digest with an expected one (if any).
pub fn verify_digest(source_name: &str, expected: Option<&str>, actual: &str) -> IoResult<()> {
    match expected {
        Some(exp) if exp != actual => Err(IoError::Digest {
            source_name: source_name.to_string(),
            expected: exp.to_string(),
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}
