use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};

use crate::{
    entities::ai::{CaptionImage, DEFAULT_MIME_TYPE},
    errors::AppError,
};

/// Longest edge sent to the captioning model
pub const CAPTION_MAX_DIMENSION: u32 = 800;
pub const THUMBNAIL_MAX_DIMENSION: u32 = 600;
pub const JPEG_QUALITY: u8 = 80;

/// Target size for fitting `width`×`height` into a `max` box. Never upscales.
///
/// Landscape images are limited by width, everything else by height.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width > height && width > max {
        let scaled = (height as f64 * max as f64 / width as f64).round() as u32;
        (max, scaled.max(1))
    } else if height > max {
        let scaled = (width as f64 * max as f64 / height as f64).round() as u32;
        (scaled.max(1), max)
    } else {
        (width, height)
    }
}

/// Shrinks an image so its longest edge is at most 800px and re-encodes it as base64 JPEG.
pub fn downscale_for_caption(bytes: &[u8]) -> Result<CaptionImage, AppError> {
    let img = image::load_from_memory(bytes)?;
    let resized = resize_to_fit(img, CAPTION_MAX_DIMENSION);
    let jpeg = encode_jpeg(&resized)?;

    Ok(CaptionImage {
        base64: STANDARD.encode(jpeg),
        mime_type: DEFAULT_MIME_TYPE.to_string(),
    })
}

pub fn make_thumbnail(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(bytes)?;
    encode_jpeg(&resize_to_fit(img, THUMBNAIL_MAX_DIMENSION))
}

/// MIME type detected from the magic bytes, only for image formats.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type())
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>, AppError> {
    // Tolerate data URLs pasted as-is
    let payload = match data.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => data,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::field("imageBase64", "Image data is not valid base64"))
}

fn resize_to_fit(img: DynamicImage, max: u32) -> DynamicImage {
    let (width, height) = fit_within(img.width(), img.height(), max);
    if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
    }
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn fit_within_scales_by_longest_edge() {
        assert_eq!(fit_within(1600, 900, 800), (800, 450));
        assert_eq!(fit_within(900, 1800, 800), (400, 800));
        assert_eq!(fit_within(1000, 1000, 800), (800, 800));
        assert_eq!(fit_within(640, 480, 800), (640, 480));
        assert_eq!(fit_within(10_000, 3, 800), (800, 1));
    }

    #[test]
    fn caption_image_is_small_jpeg() {
        let caption = downscale_for_caption(&png(1600, 1200)).unwrap();
        assert_eq!(caption.mime_type, "image/jpeg");

        let bytes = STANDARD.decode(&caption.base64).unwrap();
        assert_eq!(sniff_image_mime(&bytes), Some("image/jpeg"));

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 600));
    }

    #[test]
    fn thumbnail_does_not_upscale() {
        let thumb = make_thumbnail(&png(300, 200)).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 200));
    }

    #[test]
    fn garbage_is_rejected_as_bad_request() {
        assert!(matches!(downscale_for_caption(b"not an image"), Err(AppError::BadRequest(_))));
        assert_eq!(sniff_image_mime(b"plain text"), None);
    }

    #[test]
    fn base64_accepts_data_urls() {
        assert_eq!(decode_base64("data:image/png;base64,aGk=").unwrap(), b"hi");
        assert_eq!(decode_base64("aGk=").unwrap(), b"hi");
        assert!(decode_base64("%%%").is_err());
    }
}
