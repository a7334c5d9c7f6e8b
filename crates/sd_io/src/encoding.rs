//! Strict text decoding for source files.
//!
//! Decoding never substitutes U+FFFD: malformed input is an error the caller
//! turns into a fatal `IoError::Encoding`.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

use crate::{IoError, IoResult};

/// Resolve a WHATWG encoding label (`"utf-8"`, `"latin1"`, `"windows-1252"`, …).
///
/// Note that `latin1` / `iso-8859-1` resolve to `windows-1252` per WHATWG.
pub fn resolve_label(label: &str) -> IoResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| IoError::Manifest(format!("unknown encoding label {label:?}")))
}

/// Decode `bytes` strictly. A UTF-8 BOM is stripped when decoding as UTF-8.
pub fn decode_strict<'a>(
    bytes: &'a [u8],
    encoding: &'static Encoding,
    path_for_errors: &str,
) -> IoResult<Cow<'a, str>> {
    let body = if encoding == UTF_8 {
        bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
    } else {
        bytes
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| IoError::Encoding {
            path: path_for_errors.to_string(),
            encoding: encoding.name(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_label_maps_to_windows_1252() {
        assert_eq!(resolve_label("latin1").unwrap().name(), "windows-1252");
        assert_eq!(resolve_label(" UTF-8 ").unwrap(), UTF_8);
        assert!(resolve_label("klingon").is_err());
    }

    #[test]
    fn latin1_bytes_decode() {
        let enc = resolve_label("latin1").unwrap();
        let s = decode_strict(b"Caf\xE9", enc, "t.csv").unwrap();
        assert_eq!(s, "Café");
    }

    #[test]
    fn invalid_utf8_is_an_error_not_a_replacement() {
        let err = decode_strict(b"Caf\xE9", UTF_8, "t.csv").unwrap_err();
        assert!(matches!(err, IoError::Encoding { encoding: "UTF-8", .. }));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let s = decode_strict(b"\xEF\xBB\xBFa,b", UTF_8, "t.csv").unwrap();
        assert_eq!(s, "a,b");
    }
}
