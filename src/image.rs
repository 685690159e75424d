//! Decoding of base64 data-URI images submitted in JSON bodies.
//!
//! Recipe photos and avatars arrive as `data:image/<fmt>;base64,<data>`
//! strings. Decoding produces the raw bytes plus a filename and content
//! type; storing them is the caller's concern.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Allowed image formats for recipe photos and avatars.
pub const ALLOWED_FORMATS: &[&str] = &["jpeg", "jpg", "png", "gif"];

#[derive(Error, Debug, PartialEq)]
pub enum ImageError {
    #[error("Image must be a base64 data URI")]
    InvalidEncoding,

    #[error("Unsupported image format: {0}. Allowed: jpeg, jpg, png, gif")]
    UnsupportedFormat(String),

    #[error("Invalid base64 image data")]
    InvalidData,
}

/// A decoded image ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub data: Vec<u8>,
    /// Filename of the form `photo.<fmt>`.
    pub filename: String,
    /// Content type of the form `image/<fmt>`.
    pub content_type: String,
}

/// Decode a `data:image/<fmt>;base64,<data>` string.
///
/// The string must contain exactly one `;base64,` separator; the format is
/// taken from the segment after the last `/` in the prefix and checked
/// against the allow-list before the payload is decoded.
pub fn decode_data_uri(input: &str) -> Result<DecodedImage, ImageError> {
    if !input.starts_with("data:image") {
        return Err(ImageError::InvalidEncoding);
    }

    let parts: Vec<&str> = input.split(";base64,").collect();
    if parts.len() != 2 {
        return Err(ImageError::InvalidEncoding);
    }

    let format = parts[0].rsplit('/').next().unwrap_or_default();
    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::UnsupportedFormat(format.to_string()));
    }

    let data = STANDARD
        .decode(parts[1])
        .map_err(|_| ImageError::InvalidData)?;

    Ok(DecodedImage {
        data,
        filename: format!("photo.{}", format),
        content_type: format!("image/{}", format),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // "hello" in standard base64
    const PAYLOAD: &str = "aGVsbG8=";

    #[test]
    fn test_decode_png_data_uri() {
        let decoded = decode_data_uri(&format!("data:image/png;base64,{}", PAYLOAD)).unwrap();
        assert_eq!(decoded.data, b"hello");
        assert_eq!(decoded.filename, "photo.png");
        assert_eq!(decoded.content_type, "image/png");
    }

    #[test]
    fn test_all_allowed_formats_accepted() {
        for format in ALLOWED_FORMATS {
            let input = format!("data:image/{};base64,{}", format, PAYLOAD);
            let decoded = decode_data_uri(&input).unwrap();
            assert_eq!(decoded.filename, format!("photo.{}", format));
        }
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let input = format!("data:image/webp;base64,{}", PAYLOAD);
        assert_eq!(
            decode_data_uri(&input),
            Err(ImageError::UnsupportedFormat("webp".to_string()))
        );
    }

    #[test]
    fn test_missing_separator_rejected() {
        assert_eq!(
            decode_data_uri("data:image/png;base65,xxxx"),
            Err(ImageError::InvalidEncoding)
        );
    }

    #[test]
    fn test_duplicated_separator_rejected() {
        let input = format!("data:image/png;base64,;base64,{}", PAYLOAD);
        assert_eq!(decode_data_uri(&input), Err(ImageError::InvalidEncoding));
    }

    #[test]
    fn test_plain_string_rejected() {
        assert_eq!(decode_data_uri(PAYLOAD), Err(ImageError::InvalidEncoding));
    }

    #[test]
    fn test_bad_base64_rejected() {
        assert_eq!(
            decode_data_uri("data:image/png;base64,not!!valid"),
            Err(ImageError::InvalidData)
        );
    }
}
