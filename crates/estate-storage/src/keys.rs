//! Shared key generation for storage backends.
//!
//! Key format: `property/property_{id}` as the per-property prefix and
//! `{prefix}/image_{index}{ext}` for each image.

use std::path::Path;

/// Storage prefix under which all images of a property are stored.
pub fn image_prefix(property_id: i64) -> String {
    format!("property/property_{}", property_id)
}

/// Deterministic key for the image at `index` of an upload batch.
///
/// `ext` is the extension of `filename_hint` including its dot, or nothing
/// when the hint has no extension. Directory parts of the hint are ignored.
pub fn image_key(prefix: &str, index: usize, filename_hint: &str) -> String {
    let ext = Path::new(filename_hint)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("{}/image_{}{}", prefix, index, ext)
}
