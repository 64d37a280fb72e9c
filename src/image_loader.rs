//! # Map Image Loading and Decoding
//!
//! Resolves a project's map reference to bytes and prepares them for PDF
//! embedding. JPEG images pass through without re-encoding (PDF readers
//! decode DCTDecode natively). PNG images are decoded to RGB pixels with a
//! separate alpha channel for SMask transparency.
//!
//! Every failure is reported as an [`ImageError`]; deciding what to do about
//! it is the caller's business.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::ImageError;

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Load an image from a map reference.
///
/// Supported references:
/// - `data:image/...;base64,...` data URI
/// - absolute file path
/// - relative file path or bare file name, joined onto `image_dir` when one
///   is configured
/// - raw base64, when no file by that name can be read
pub fn load_image(reference: &str, image_dir: Option<&Path>) -> Result<LoadedImage, ImageError> {
    let raw_bytes = read_source_bytes(reference, image_dir)?;
    decode_image_bytes(&raw_bytes)
}

/// Resolve the reference to raw image bytes.
fn read_source_bytes(reference: &str, image_dir: Option<&Path>) -> Result<Vec<u8>, ImageError> {
    // Data URI: data:image/png;base64,iVBOR...
    if reference.starts_with("data:image/") {
        let comma_pos = reference.find(',').ok_or(ImageError::InvalidDataUri)?;
        return base64_decode(&reference[comma_pos + 1..]);
    }

    let path = resolve_path(reference, image_dir);
    // Not readable as a file: the reference may be raw base64. If it isn't,
    // the read error is the one worth reporting.
    std::fs::read(&path).or_else(|source| {
        base64_decode(reference).map_err(|_| ImageError::Io { path, source })
    })
}

fn resolve_path(reference: &str, image_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(reference);
    match image_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

fn base64_decode(input: &str) -> Result<Vec<u8>, ImageError> {
    use base64::Engine;
    Ok(base64::engine::general_purpose::STANDARD.decode(input)?)
}

/// Detect image format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, ImageError> {
    if data.len() < 4 {
        return Err(ImageError::TooShort);
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(ImageError::UnsupportedFormat)
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions and color space without decoding pixels.
/// The raw JPEG bytes are passed through to the PDF (DCTDecode).
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, ImageError> {
    let color_space = detect_jpeg_color_space(data)?;

    let reader = image::io::Reader::new(Cursor::new(data)).with_guessed_format().map_err(
        |e| ImageError::Decode(image::ImageError::IoError(e)),
    )?;
    let (width, height) = reader.into_dimensions()?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space,
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers to find the SOF (Start of Frame) segment and read
/// the number of components to determine color space. Only gray and RGB
/// JPEGs can be passed through; CMYK and other layouts are rejected.
fn detect_jpeg_color_space(data: &[u8]) -> Result<JpegColorSpace, ImageError> {
    let mut i = 2; // skip SOI marker (FF D8)
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        // SOF markers: C0-C3, C5-C7, C9-CB, CD-CF
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            // length(2) + precision(1) + height(2) + width(2) + num_components(1)
            return match data[i + 9] {
                1 => Ok(JpegColorSpace::DeviceGray),
                3 => Ok(JpegColorSpace::DeviceRGB),
                _ => Err(ImageError::UnsupportedFormat),
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    Ok(JpegColorSpace::DeviceRGB)
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, ImageError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, alpha]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), width, height, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn test_is_jpeg() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_jpeg(&[0xFF]));
    }

    #[test]
    fn test_is_png() {
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_invalid_data_uri() {
        let result = load_image("data:image/png;base64", None);
        assert!(matches!(result, Err(ImageError::InvalidDataUri)));
    }

    #[test]
    fn test_bad_base64() {
        let result = load_image("data:image/png;base64,@@@@", None);
        assert!(matches!(result, Err(ImageError::Base64(_))));
    }

    #[test]
    fn test_too_short_data() {
        assert!(matches!(decode_image_bytes(&[0x00, 0x01]), Err(ImageError::TooShort)));
    }

    #[test]
    fn test_unsupported_format() {
        let result = decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]);
        assert!(matches!(result, Err(ImageError::UnsupportedFormat)));
    }

    #[test]
    fn test_truncated_png_fails_to_decode() {
        let mut data = png_bytes(4, 4, 255);
        data.truncate(20);
        assert!(matches!(decode_image_bytes(&data), Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_image("does-not-exist.png", Some(Path::new("/definitely/not/here")));
        match result {
            Err(ImageError::Io { path, .. }) => {
                assert_eq!(path, Path::new("/definitely/not/here/does-not-exist.png"));
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_absolute_path_ignores_image_dir() {
        let resolved = resolve_path("/srv/maps/a.png", Some(Path::new("/uploads")));
        assert_eq!(resolved, Path::new("/srv/maps/a.png"));
        let resolved = resolve_path("a.png", Some(Path::new("/uploads")));
        assert_eq!(resolved, Path::new("/uploads/a.png"));
        let resolved = resolve_path("a.png", None);
        assert_eq!(resolved, Path::new("a.png"));
    }

    #[test]
    fn test_decode_minimal_png() {
        let loaded = decode_image_bytes(&png_bytes(1, 1, 255)).unwrap();
        assert_eq!(loaded.width_px, 1);
        assert_eq!(loaded.height_px, 1);
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[255, 0, 0]);
                assert!(alpha.is_none(), "Fully opaque should have no alpha");
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_decode_png_with_alpha() {
        let loaded = decode_image_bytes(&png_bytes(1, 1, 128)).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[255, 0, 0]);
                assert_eq!(alpha.as_ref().unwrap(), &[128]);
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_decode_minimal_jpeg() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));

        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = decode_image_bytes(&buf).unwrap();
        assert_eq!(loaded.width_px, 2);
        assert_eq!(loaded.height_px, 2);
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert_eq!(*color_space, JpegColorSpace::DeviceRGB);
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();
        buf
    }

    /// Overwrite the component count in the first SOF0 segment.
    fn with_component_count(mut data: Vec<u8>, count: u8) -> Vec<u8> {
        let sof = data.windows(2).position(|w| w == [0xFF, 0xC0]).unwrap();
        data[sof + 9] = count;
        data
    }

    #[test]
    fn test_cmyk_jpeg_is_rejected() {
        let data = with_component_count(jpeg_bytes(), 4);
        assert!(matches!(decode_image_bytes(&data), Err(ImageError::UnsupportedFormat)));
        assert!(matches!(detect_jpeg_color_space(&data), Err(ImageError::UnsupportedFormat)));
    }

    #[test]
    fn test_jpeg_component_counts() {
        let gray = with_component_count(jpeg_bytes(), 1);
        assert_eq!(detect_jpeg_color_space(&gray).unwrap(), JpegColorSpace::DeviceGray);
        assert_eq!(detect_jpeg_color_space(&jpeg_bytes()).unwrap(), JpegColorSpace::DeviceRGB);
        let two = with_component_count(jpeg_bytes(), 2);
        assert!(detect_jpeg_color_space(&two).is_err());
    }

    #[test]
    fn test_raw_base64_reference() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 2, 255));

        let loaded = load_image(&b64, None).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (3, 2));

        // Also when an image directory is configured but holds no such file.
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_image(&b64, Some(dir.path())).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (3, 2));
    }

    #[test]
    fn test_existing_file_wins_over_base64() {
        let dir = tempfile::tempdir().unwrap();
        // "abcd" is also valid base64, but the file is read.
        std::fs::write(dir.path().join("abcd"), png_bytes(5, 1, 255)).unwrap();
        let loaded = load_image("abcd", Some(dir.path())).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (5, 1));
    }

    #[test]
    fn test_base64_data_uri() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 2, 255));
        let data_uri = format!("data:image/png;base64,{}", b64);

        let loaded = load_image(&data_uri, None).unwrap();
        assert_eq!(loaded.width_px, 3);
        assert_eq!(loaded.height_px, 2);
    }

    #[test]
    fn test_load_from_image_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("map.png"), png_bytes(8, 4, 255)).unwrap();

        let loaded = load_image("map.png", Some(dir.path())).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (8, 4));
    }
}
