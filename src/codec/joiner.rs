//! Section joining.
//!
//! Each section is independently encoded with the URL-safe, padding-free
//! base64 alphabet and sections are concatenated with the reserved `!`
//! separator, which never appears in the alphabet's output. The outer
//! channel's structural delimiter (NUL) can therefore never occur inside
//! the joined string.
//!
//! `decode(encode(S)) == S` for any non-empty ordered section list `S`,
//! including single sections and zero-length sections.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::core::{CodecError, SECTION_SEPARATOR};

/// Pack ordered binary sections into one text-safe string.
pub fn encode<S: AsRef<[u8]>>(sections: &[S]) -> String {
    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            out.push(SECTION_SEPARATOR as char);
        }
        out.push_str(&URL_SAFE_NO_PAD.encode(section));
    }
    out
}

/// Unpack a joined string back into its ordered binary sections.
///
/// Every separator-delimited run is decoded, including the trailing run
/// with no following separator and zero-length runs. The empty string
/// decodes to an empty list.
pub fn decode(text: &str) -> Result<Vec<Vec<u8>>, CodecError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    text.split(SECTION_SEPARATOR as char)
        .map(|run| {
            URL_SAFE_NO_PAD
                .decode(run)
                .map_err(|e| CodecError::Format(format!("invalid section encoding: {e}")))
        })
        .collect()
}
