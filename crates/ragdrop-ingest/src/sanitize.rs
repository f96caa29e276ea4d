//! Lossy UTF-8 sanitization for extracted text.

use std::borrow::Cow;

/// Decode `bytes` as UTF-8, dropping every malformed sequence.
///
/// Never fails. Valid input is returned borrowed and unchanged.
pub fn sanitize(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                out.push_str(text);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                // error_len is None for a truncated sequence at the very end
                let skip = e.error_len().unwrap_or(after.len());
                rest = &after[skip..];
            }
        }
    }

    Cow::Owned(out)
}
