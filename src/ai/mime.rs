pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}

/// Whether `mime` parses as a media type for a multipart part.
fn is_valid_mime(mime: &str) -> bool {
    reqwest::multipart::Part::text("").mime_str(mime).is_ok()
}

/// MIME type for an upload: the client's declared type, unless it is missing,
/// generic or unparseable.
pub fn resolve_upload_mime(declared: Option<&str>, bytes: &[u8]) -> String {
    match declared.map(str::trim) {
        Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
            if is_valid_mime(mime) {
                return mime.to_string();
            }
            tracing::warn!("Ignoring malformed upload MIME type '{}'", mime);
            detect_image_mime(bytes).to_string()
        }
        _ => detect_image_mime(bytes).to_string(),
    }
}
