//! Compression integration tests against the real encoders

use imgly_pixelcut::{
    compress, compress_to_size, encoder_for, CompressionFormat, EncoderSettings, Quality,
    RasterView, SearchOutcome, MAX_SEARCH_PROBES,
};

/// Smooth gradient with some high-frequency texture so quality matters
fn photo_like(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let noise = ((x * 7919 + y * 104_729) % 61) as u8;
            data.extend_from_slice(&[
                (x * 255 / width) as u8 ^ noise,
                (y * 255 / height) as u8,
                ((x + y) * 127 / (width + height)) as u8 + noise,
                255,
            ]);
        }
    }
    data
}

fn lossy_formats() -> Vec<CompressionFormat> {
    let mut formats = vec![CompressionFormat::Jpeg];
    if cfg!(feature = "webp-support") {
        formats.push(CompressionFormat::WebP);
    }
    formats
}

#[test]
fn test_quality_lowers_size() {
    let data = photo_like(64, 64);
    let raster = RasterView::new(&data, 64, 64).unwrap();
    let settings = EncoderSettings::default();

    for format in lossy_formats() {
        let high = compress(raster, format, Quality::new(95).unwrap(), &settings).unwrap();
        let low = compress(raster, format, Quality::new(10).unwrap(), &settings).unwrap();
        assert!(low.len() < high.len(), "{} q10 should be smaller than q95", format);
    }
}

#[test]
fn test_lossy_output_decodes_with_original_dimensions() {
    let data = photo_like(40, 24);
    let raster = RasterView::new(&data, 40, 24).unwrap();

    for format in lossy_formats() {
        let bytes = compress(raster, format, Quality::new(80).unwrap(), &EncoderSettings::default())
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 24), "{}", format);
    }
}

#[test]
fn test_png_is_exact() {
    let data: Vec<u8> = (0..32 * 16 * 4).map(|i| (i * 31 % 256) as u8).collect();
    let raster = RasterView::new(&data, 32, 16).unwrap();
    let bytes = compress(
        raster,
        CompressionFormat::Png,
        Quality::new(40).unwrap(),
        &EncoderSettings::default(),
    )
    .unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.as_raw(), &data);
}

#[test]
fn test_target_size_respected_when_reachable() {
    let data = photo_like(64, 64);
    let raster = RasterView::new(&data, 64, 64).unwrap();
    let settings = EncoderSettings::default();

    for format in lossy_formats() {
        let floor = compress(raster, format, Quality::MIN, &settings).unwrap().len();
        let ceiling = compress(raster, format, Quality::MAX, &settings).unwrap().len();
        let target = floor + (ceiling - floor) / 2;

        let encoder = encoder_for(format, &settings).unwrap();
        let result = compress_to_size(raster, target, encoder.as_ref()).unwrap();
        assert_eq!(result.outcome, SearchOutcome::WithinTarget, "{}", format);
        assert!(result.bytes.len() <= target, "{}", format);
        assert!(result.attempts <= MAX_SEARCH_PROBES + 1);

        // q100 is over budget by construction
        let chosen = result.quality.unwrap().get();
        assert!(chosen < 100);
    }
}

#[test]
fn test_generous_target_keeps_full_quality() {
    let data = photo_like(16, 16);
    let raster = RasterView::new(&data, 16, 16).unwrap();
    let encoder = encoder_for(CompressionFormat::Jpeg, &EncoderSettings::default()).unwrap();

    let result = compress_to_size(raster, 10 * 1024 * 1024, encoder.as_ref()).unwrap();
    assert_eq!(result.quality, Some(Quality::MAX));
    assert_eq!(result.attempts, 1);
    assert_eq!(result.outcome, SearchOutcome::WithinTarget);
}

#[test]
fn test_unreachable_target_returns_floor() {
    let data = photo_like(64, 64);
    let raster = RasterView::new(&data, 64, 64).unwrap();
    let encoder = encoder_for(CompressionFormat::Jpeg, &EncoderSettings::default()).unwrap();

    let result = compress_to_size(raster, 1, encoder.as_ref()).unwrap();
    assert_eq!(result.outcome, SearchOutcome::FloorExceedsTarget);
    assert_eq!(result.quality, Some(Quality::MIN));
    assert!(!result.fits(1));
    assert!(image::load_from_memory(&result.bytes).is_ok());
}

#[test]
fn test_png_target_is_single_lossless_encode() {
    let data = photo_like(16, 16);
    let raster = RasterView::new(&data, 16, 16).unwrap();
    let encoder = encoder_for(CompressionFormat::Png, &EncoderSettings::default()).unwrap();

    let result = compress_to_size(raster, 1, encoder.as_ref()).unwrap();
    assert_eq!(result.outcome, SearchOutcome::Lossless);
    assert_eq!(result.quality, None);
    assert_eq!(result.attempts, 1);
}

#[test]
fn test_zero_target_rejected() {
    let data = photo_like(4, 4);
    let raster = RasterView::new(&data, 4, 4).unwrap();
    let encoder = encoder_for(CompressionFormat::Jpeg, &EncoderSettings::default()).unwrap();
    assert!(compress_to_size(raster, 0, encoder.as_ref()).is_err());
}
