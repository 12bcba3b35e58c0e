use super::*;
use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

mod common {
    use super::*;

    pub(super) fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    pub(super) fn encoded(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    pub(super) fn small_bounds() -> AssetConfig {
        AssetConfig {
            max_width: 64,
            max_height: 32,
            ..AssetConfig::default()
        }
    }
}

mod classify {
    use super::*;

    #[test]
    fn test_supported_images() {
        assert_eq!(classify("image/jpeg").unwrap(), AssetKind::Image(ImageKind::Jpeg));
        assert_eq!(classify("image/jpg").unwrap(), AssetKind::Image(ImageKind::Jpeg));
        assert_eq!(classify("IMAGE/PNG").unwrap(), AssetKind::Image(ImageKind::Png));
        assert_eq!(classify("image/webp").unwrap(), AssetKind::Image(ImageKind::WebP));
    }

    #[test]
    fn test_unsupported_images() {
        for mime in ["image/gif", "image/svg+xml", "image/bmp"] {
            let err = classify(mime).unwrap_err();
            assert!(matches!(err, AssetError::UnsupportedType(ref m) if m == mime));
        }
    }

    #[test]
    fn test_image_category_matches_classify() {
        for mime in [" IMAGE/PNG ", "image/gif", "Image/Tiff"] {
            assert!(is_image_type(mime));
            assert!(!matches!(classify(mime), Ok(AssetKind::File)));
        }
        for mime in ["application/pdf", " text/plain", ""] {
            assert!(!is_image_type(mime));
            assert_eq!(classify(mime).unwrap(), AssetKind::File);
        }
    }

    #[test]
    fn test_everything_else_is_a_file() {
        for mime in ["application/pdf", "text/plain", "", "application/msword"] {
            assert_eq!(classify(mime).unwrap(), AssetKind::File);
        }
    }
}

mod target_dimensions {
    use super::*;

    #[test]
    fn test_within_bounds_untouched() {
        assert_eq!(target_dimensions(800, 600, 1920, 1080), (800, 600));
        assert_eq!(target_dimensions(1920, 1080, 1920, 1080), (1920, 1080));
    }

    #[test]
    fn test_height_bound_dominates() {
        assert_eq!(target_dimensions(4000, 3000, 1920, 1080), (1440, 1080));
    }

    #[test]
    fn test_width_bound_dominates() {
        assert_eq!(target_dimensions(3840, 1000, 1920, 1080), (1920, 500));
    }

    #[test]
    fn test_tall_image() {
        assert_eq!(target_dimensions(1000, 5000, 1920, 1080), (216, 1080));
    }

    #[test]
    fn test_joint_scale_is_order_independent() {
        for (w, h) in [(1921, 1081), (5000, 2813), (2500, 1500), (7, 100_000)] {
            let (tw, th) = target_dimensions(w, h, 1920, 1080);
            assert!(tw <= 1920 && th <= 1080, "{w}x{h} -> {tw}x{th}");
            assert!(tw >= 1 && th >= 1);
        }
    }

    #[test]
    fn test_zero_sized_untouched() {
        assert_eq!(target_dimensions(0, 10, 5, 5), (0, 10));
    }
}

mod optimize {
    use super::common::*;
    use super::*;

    #[test]
    fn test_oversized_jpeg_is_downscaled() {
        let source = encoded(&gradient(256, 64), ImageFormat::Jpeg);

        let result = optimize_image(&source, ImageKind::Jpeg, &small_bounds()).unwrap();

        assert_eq!((result.width, result.height), (64, 16));
        let decoded = image::load_from_memory_with_format(&result.bytes, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (64, 16));
    }

    #[test]
    fn test_png_keeps_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(128, 128, |x, _| {
            Rgba([255, 0, 0, (x * 2) as u8])
        }));
        let source = encoded(&image, ImageFormat::Png);

        let result = optimize_image(&source, ImageKind::Png, &small_bounds()).unwrap();

        assert_eq!((result.width, result.height), (32, 32));
        let decoded = image::load_from_memory_with_format(&result.bytes, ImageFormat::Png).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_webp_is_downscaled() {
        let source = encoded(&gradient(100, 100), ImageFormat::WebP);

        let result = optimize_image(&source, ImageKind::WebP, &small_bounds()).unwrap();

        assert_eq!((result.width, result.height), (32, 32));
        let decoded = image::load_from_memory_with_format(&result.bytes, ImageFormat::WebP).unwrap();
        assert_eq!(decoded.dimensions(), (32, 32));
    }

    #[test]
    fn test_small_image_never_grows() {
        let source = encoded(&gradient(20, 10), ImageFormat::Png);

        let result = optimize_image(&source, ImageKind::Png, &small_bounds()).unwrap();

        assert_eq!((result.width, result.height), (20, 10));
        assert!(result.bytes.len() <= source.len());
    }

    #[test]
    fn test_garbage_bytes_are_an_image_error() {
        let err = optimize_image(b"definitely not a jpeg", ImageKind::Jpeg, &small_bounds())
            .unwrap_err();
        assert!(matches!(err, AssetError::Image(_)));
    }
}
