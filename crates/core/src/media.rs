//! Image media helpers: MIME lookup, format sniffing, base64 and data URLs.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;

use crate::error::CoreError;

/// Image formats accepted as skybox / chat assets.
pub const SUPPORTED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Guess an image MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Identify the image format from magic bytes.
///
/// Only the header is inspected; the image is never decoded. Fails with
/// [`CoreError::UnsupportedMedia`] for empty input, unknown signatures and
/// formats outside [`SUPPORTED_FORMATS`].
pub fn sniff_image(bytes: &[u8]) -> Result<ImageFormat, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::UnsupportedMedia("empty payload".into()));
    }
    let format = image::guess_format(bytes)
        .map_err(|e| CoreError::UnsupportedMedia(format!("unrecognised image data: {e}")))?;
    if SUPPORTED_FORMATS.contains(&format) {
        Ok(format)
    } else {
        Err(CoreError::UnsupportedMedia(format!(
            "image format {format:?} is not supported"
        )))
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode a base64 image payload, tolerating a leading `data:...;base64,`.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, CoreError> {
    let raw = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    BASE64
        .decode(raw.trim())
        .map_err(|e| CoreError::Validation(format!("invalid base64 image: {e}")))
}

pub fn data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", encode_base64(bytes))
}

/// Build a data URL for an uploaded file, picking the MIME type from its name.
pub fn data_url_for_file(file_name: &str, bytes: &[u8]) -> Result<String, CoreError> {
    let mime = mime_for_path(Path::new(file_name)).ok_or_else(|| {
        CoreError::UnsupportedMedia(format!("could not determine MIME type of '{file_name}'"))
    })?;
    Ok(data_url(bytes, mime))
}
