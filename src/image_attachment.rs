//! Embedding uploaded images as `data:` URIs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Guesses an image MIME type from the leading bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        _ => None,
    }
}

/// Encodes `bytes` as `data:<mime>;base64,<payload>`.
///
/// An empty or missing `mime` is replaced by the sniffed type.
///
/// ```rust
/// use catalog_editor_core::image_attachment::encode_data_uri;
///
/// let uri = encode_data_uri(b"GIF89a", None);
/// assert_eq!(uri, "data:image/gif;base64,R0lGODlh");
/// ```
pub fn encode_data_uri(bytes: &[u8], mime: Option<&str>) -> String {
    let mime = mime
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or_else(|| sniff_mime(bytes))
        .unwrap_or(FALLBACK_MIME);
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
