//! Base64 data-URL handling for sample images.

use std::path::Path;

use base64::Engine;

use crate::error::{PlastiscanError, PlastiscanResult};

/// MIME type assumed when the data URL prefix does not name one.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// A data URL split into its MIME type and base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime_type: String,
    pub data: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split `data:<mime>;base64,<payload>` at the first comma.
    ///
    /// The payload is passed through untouched; a bad payload is reported
    /// by the vision model, not here.
    pub fn parse(url: &'a str) -> PlastiscanResult<Self> {
        let (prefix, data) = url
            .split_once(',')
            .ok_or_else(|| PlastiscanError::invalid_image("expected a data URL with a ',' before the payload"))?;

        let data = data.trim();
        if data.is_empty() {
            return Err(PlastiscanError::invalid_image("data URL has an empty payload"));
        }

        let mime_type = prefix
            .strip_prefix("data:")
            .map(|rest| rest.split(';').next().unwrap_or("").trim())
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        Ok(Self { mime_type, data })
    }
}

/// Encode raw image bytes as a data URL.
pub fn encode_data_url(bytes: &[u8], mime_type: &str) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, b64)
}

/// Read an image file and encode it as a data URL.
pub fn read_data_url(path: &Path) -> PlastiscanResult<String> {
    let bytes = std::fs::read(path)?;
    Ok(encode_data_url(&bytes, &detect_media_type(path)))
}

/// Detect media type from a file extension.
pub fn detect_media_type(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => DEFAULT_MIME_TYPE,
    }
    .to_string()
}
