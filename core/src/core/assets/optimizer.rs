//! Image downscaling and re-encoding.

use super::error::AssetError;
use crate::types::AssetConfig;
use fast_image_resize::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
}

impl ImageKind {
    fn format(self) -> ImageFormat {
        match self {
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Png => ImageFormat::Png,
            ImageKind::WebP => ImageFormat::WebP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image(ImageKind),
    File,
}

const SUPPORTED_IMAGE_TYPES: &[(&str, ImageKind)] = &[
    ("image/jpeg", ImageKind::Jpeg),
    ("image/jpg", ImageKind::Jpeg),
    ("image/png", ImageKind::Png),
    ("image/webp", ImageKind::WebP),
];

fn normalize_mime(mime_type: &str) -> String {
    mime_type.trim().to_ascii_lowercase()
}

/// Whether the declared type falls in the `image/*` category, supported or not.
pub fn is_image_type(mime_type: &str) -> bool {
    normalize_mime(mime_type).starts_with("image/")
}

/// `image/*` must be one of the supported image types; everything else is a
/// plain file.
pub fn classify(mime_type: &str) -> Result<AssetKind, AssetError> {
    if !is_image_type(mime_type) {
        return Ok(AssetKind::File);
    }

    let normalized = normalize_mime(mime_type);

    SUPPORTED_IMAGE_TYPES
        .iter()
        .find(|(supported, _)| *supported == normalized)
        .map(|(_, kind)| AssetKind::Image(*kind))
        .ok_or_else(|| AssetError::UnsupportedType(mime_type.to_string()))
}

/// Largest size within `max_width` × `max_height` that keeps the aspect ratio.
/// Never upscales.
pub fn target_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let scale = (f64::from(max_width) / f64::from(width))
        .min(f64::from(max_height) / f64::from(height))
        .min(1.0);
    if scale >= 1.0 {
        return (width, height);
    }

    let scaled_width = ((f64::from(width) * scale).round() as u32).clamp(1, max_width);
    let scaled_height = ((f64::from(height) * scale).round() as u32).clamp(1, max_height);
    (scaled_width, scaled_height)
}

#[derive(Debug)]
pub struct OptimizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decodes, downscales to the configured bounds and re-encodes in the source
/// format. When nothing was resized and re-encoding does not shrink the payload,
/// the source bytes are returned as-is.
pub fn optimize_image(
    bytes: &[u8],
    kind: ImageKind,
    config: &AssetConfig,
) -> Result<OptimizedImage, AssetError> {
    let src_image = image::load_from_memory_with_format(bytes, kind.format())?;
    let (src_width, src_height) = (src_image.width(), src_image.height());

    let (dst_width, dst_height) =
        target_dimensions(src_width, src_height, config.max_width, config.max_height);
    let resized = (dst_width, dst_height) != (src_width, src_height);

    let image = if resized {
        let mut dst_image = DynamicImage::new(dst_width, dst_height, src_image.color());

        let mut resizer = Resizer::new();
        resizer.resize(
            &src_image,
            &mut dst_image,
            Some(&ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))),
        )?;
        dst_image
    } else {
        src_image
    };

    let encoded = encode(&image, kind, config.quality)?;
    let bytes = if !resized && encoded.len() >= bytes.len() {
        bytes.to_vec()
    } else {
        encoded
    };

    Ok(OptimizedImage {
        bytes,
        width: dst_width,
        height: dst_height,
    })
}

/// PNG and WebP are encoded losslessly, so `quality` only affects JPEG.
fn encode(image: &DynamicImage, kind: ImageKind, quality: f32) -> Result<Vec<u8>, AssetError> {
    let mut out = Vec::new();

    match kind {
        ImageKind::Jpeg => {
            let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let encoder = JpegEncoder::new_with_quality(&mut out, quality);
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        }
        ImageKind::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut out,
                CompressionType::Best,
                PngFilterType::Adaptive,
            );
            image.write_with_encoder(encoder)?;
        }
        ImageKind::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut out);
            let image = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };
            image.write_with_encoder(encoder)?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests;
