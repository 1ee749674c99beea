//! Image decoding: turn an [`ImageSource`] into an RGBA bitmap.
//!
//! Accepts raw encoded bytes (PNG, JPEG, BMP, WebP, or anything else the
//! `image` crate's enabled codecs can read) or a base64 `data:` URI as
//! produced by a browser canvas or webcam capture.

use base64::Engine as _;
use image::RgbaImage;

use crate::types::{DecodeError, ImageSource};

/// Decode a source into a straight-alpha RGBA image.
///
/// # Errors
///
/// Returns [`DecodeError::EmptyInput`] if the source holds no data.
/// Returns [`DecodeError::InvalidDataUri`] if a data URI is malformed.
/// Returns [`DecodeError::Image`] if the format is unrecognized or the
/// data is corrupt.
pub fn decode_source(source: &ImageSource) -> Result<RgbaImage, DecodeError> {
    match source {
        ImageSource::Encoded(bytes) => decode_bytes(bytes),
        ImageSource::DataUri(uri) => decode_bytes(&data_uri_payload(uri)?),
    }
}

/// Decode encoded image bytes into RGBA.
///
/// # Errors
///
/// Returns [`DecodeError::EmptyInput`] if `bytes` is empty,
/// [`DecodeError::Image`] if decoding fails, or
/// [`DecodeError::ZeroSized`] if the decoded image has no pixels.
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    ensure_drawable(image::load_from_memory(bytes)?.to_rgba8())
}

fn ensure_drawable(image: RgbaImage) -> Result<RgbaImage, DecodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::ZeroSized { width, height });
    }
    Ok(image)
}

/// Extract and base64-decode the payload of a `data:[<mime>];base64,<data>` URI.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidDataUri`] when the scheme, the `;base64`
/// marker, or the comma separator is missing, or the payload is not
/// valid base64. Returns [`DecodeError::EmptyInput`] for an empty payload.
pub fn data_uri_payload(uri: &str) -> Result<Vec<u8>, DecodeError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| DecodeError::InvalidDataUri("missing 'data:' scheme".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidDataUri("missing ',' before payload".into()))?;

    if !header
        .split(';')
        .any(|param| param.eq_ignore_ascii_case("base64"))
    {
        return Err(DecodeError::InvalidDataUri(format!(
            "payload is not base64-encoded (header '{header}')"
        )));
    }

    if payload.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| DecodeError::InvalidDataUri(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode a uniformly colored RGBA image as PNG.
    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba(color));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn data_uri(bytes: &[u8]) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[test]
    fn empty_bytes_return_error() {
        let result = decode_source(&ImageSource::Encoded(Vec::new()));
        assert!(matches!(result, Err(DecodeError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_return_image_error() {
        let result = decode_source(&ImageSource::Encoded(vec![0xFF, 0xFE, 0x00, 0x01]));
        assert!(matches!(result, Err(DecodeError::Image(_))));
    }

    #[test]
    fn png_bytes_decode_with_dimensions() {
        let img = decode_source(&ImageSource::Encoded(png(17, 31, [10, 20, 30, 255]))).unwrap();
        assert_eq!(img.dimensions(), (17, 31));
        assert_eq!(img.get_pixel(3, 3).0, [10, 20, 30, 255]);
    }

    #[test]
    fn data_uri_decodes_like_bytes() {
        let bytes = png(4, 2, [200, 0, 0, 255]);
        let img = decode_source(&ImageSource::DataUri(data_uri(&bytes))).unwrap();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(0, 0).0, [200, 0, 0, 255]);
    }

    #[test]
    fn data_uri_without_scheme_is_rejected() {
        let result = data_uri_payload("image/png;base64,AAAA");
        assert!(matches!(result, Err(DecodeError::InvalidDataUri(_))));
    }

    #[test]
    fn data_uri_without_comma_is_rejected() {
        let result = data_uri_payload("data:image/png;base64");
        assert!(matches!(result, Err(DecodeError::InvalidDataUri(_))));
    }

    #[test]
    fn non_base64_data_uri_is_rejected() {
        let result = data_uri_payload("data:text/plain,hello");
        assert!(matches!(result, Err(DecodeError::InvalidDataUri(_))));
    }

    #[test]
    fn bad_base64_is_rejected() {
        let result = data_uri_payload("data:image/png;base64,!!!not-base64!!!");
        assert!(matches!(result, Err(DecodeError::InvalidDataUri(_))));
    }

    #[test]
    fn empty_payload_is_empty_input() {
        let result = data_uri_payload("data:image/png;base64,");
        assert!(matches!(result, Err(DecodeError::EmptyInput)));
    }

    #[test]
    fn zero_sized_bitmap_is_a_decode_error() {
        let result = ensure_drawable(RgbaImage::new(0, 3));
        assert!(matches!(
            result,
            Err(DecodeError::ZeroSized {
                width: 0,
                height: 3
            })
        ));
        assert!(ensure_drawable(RgbaImage::new(1, 1)).is_ok());
    }

    #[test]
    fn valid_base64_of_garbage_fails_in_decoder() {
        let uri = data_uri(b"definitely not an image");
        let result = decode_source(&ImageSource::DataUri(uri));
        assert!(matches!(result, Err(DecodeError::Image(_))));
    }
}
