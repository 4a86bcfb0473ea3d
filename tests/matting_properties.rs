//! Property tests for the matting tools
//!
//! Random small rasters exercise invariants that must hold for any input:
//! keying never adds opacity, wider tolerances never shrink a selection, and
//! GrabCut never selects outside its seed rectangle.

use imgly_pixelcut::{
    matting, ColorKeyParams, GrabCutParams, RasterView, RectSeed, Rgb, SegmentationMask,
    WandParams,
};
use proptest::prelude::*;

/// Raster with a small palette so that equal colors actually occur
fn arb_raster() -> impl Strategy<Value = (Vec<u8>, u32, u32)> {
    (1u32..9, 1u32..9).prop_flat_map(|(w, h)| {
        let palette = prop_oneof![
            Just([255u8, 255, 255]),
            Just([250u8, 250, 250]),
            Just([200u8, 30, 30]),
            Just([0u8, 0, 0]),
            any::<[u8; 3]>(),
        ];
        let pixel = (palette, any::<u8>()).prop_map(|([r, g, b], a)| [r, g, b, a]);
        proptest::collection::vec(pixel, (w * h) as usize)
            .prop_map(move |pixels| (pixels.concat(), w, h))
    })
}

fn selected(mask: &SegmentationMask) -> Vec<bool> {
    mask.data.iter().map(|&v| v == SegmentationMask::SELECTED).collect()
}

proptest! {
    #[test]
    fn keying_only_lowers_alpha(
        (data, w, h) in arb_raster(),
        target in any::<[u8; 3]>(),
        tolerance in 0.0f32..450.0,
        feather in 0.0f32..100.0,
    ) {
        let raster = RasterView::new(&data, w, h).unwrap();
        let params = ColorKeyParams::new(Rgb::from(target), tolerance).with_feather(feather);
        let keyed = matting::remove_color(raster, &params).unwrap();

        prop_assert_eq!(keyed.len(), data.len());
        for (out, inp) in keyed.chunks_exact(4).zip(data.chunks_exact(4)) {
            prop_assert_eq!(&out[..3], &inp[..3]);
            prop_assert!(out[3] <= inp[3]);
        }
    }

    #[test]
    fn keying_is_monotone_in_tolerance(
        (data, w, h) in arb_raster(),
        target in any::<[u8; 3]>(),
        low in 0.0f32..200.0,
        extra in 0.0f32..200.0,
    ) {
        let raster = RasterView::new(&data, w, h).unwrap();
        let narrow = matting::remove_color(raster, &ColorKeyParams::new(Rgb::from(target), low)).unwrap();
        let wide = matting::remove_color(raster, &ColorKeyParams::new(Rgb::from(target), low + extra)).unwrap();

        for (n, w) in narrow.chunks_exact(4).zip(wide.chunks_exact(4)) {
            prop_assert!(w[3] <= n[3]);
        }
    }

    #[test]
    fn keying_is_idempotent(
        (data, w, h) in arb_raster(),
        target in any::<[u8; 3]>(),
        tolerance in 0.0f32..300.0,
    ) {
        let params = ColorKeyParams::new(Rgb::from(target), tolerance);
        let once = matting::remove_color(RasterView::new(&data, w, h).unwrap(), &params).unwrap();
        let twice = matting::remove_color(RasterView::new(&once, w, h).unwrap(), &params).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn wand_global_contains_connected(
        (data, w, h) in arb_raster(),
        seed in (0u32..8, 0u32..8),
        tolerance in 0.0f32..300.0,
    ) {
        let (sx, sy) = (seed.0 % w, seed.1 % h);
        let raster = RasterView::new(&data, w, h).unwrap();
        let connected = matting::select(raster, &WandParams::new(sx, sy, tolerance)).unwrap();
        let global = matting::select(raster, &WandParams::new(sx, sy, tolerance).global()).unwrap();

        prop_assert!(connected.is_selected(sx, sy));
        for (c, g) in selected(&connected).into_iter().zip(selected(&global)) {
            prop_assert!(!c || g);
        }
    }

    #[test]
    fn wand_is_monotone_in_tolerance(
        (data, w, h) in arb_raster(),
        seed in (0u32..8, 0u32..8),
        low in 0.0f32..200.0,
        extra in 0.0f32..200.0,
    ) {
        let (sx, sy) = (seed.0 % w, seed.1 % h);
        let raster = RasterView::new(&data, w, h).unwrap();
        let narrow = matting::select(raster, &WandParams::new(sx, sy, low)).unwrap();
        let wide = matting::select(raster, &WandParams::new(sx, sy, low + extra)).unwrap();

        for (n, w) in selected(&narrow).into_iter().zip(selected(&wide)) {
            prop_assert!(!n || w);
        }
    }

    #[test]
    fn wand_zero_tolerance_selects_exact_matches(
        (data, w, h) in arb_raster(),
        seed in (0u32..8, 0u32..8),
    ) {
        let (sx, sy) = (seed.0 % w, seed.1 % h);
        let raster = RasterView::new(&data, w, h).unwrap();
        let seed_color = raster.rgb_at(sx, sy);
        let mask = matting::select(raster, &WandParams::new(sx, sy, 0.0).global()).unwrap();

        for (i, is_selected) in selected(&mask).into_iter().enumerate() {
            prop_assert_eq!(is_selected, raster.rgb(i) == seed_color);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn grabcut_never_selects_outside_rect(
        (data, w, h) in arb_raster(),
        rect in (-2i64..6, -2i64..6, 1u32..10, 1u32..10),
        iterations in 1u32..4,
    ) {
        let raster = RasterView::new(&data, w, h).unwrap();
        let seed = RectSeed::new(rect.0, rect.1, rect.2, rect.3);
        let Ok(clipped) = seed.clip(w, h) else {
            // rectangles with no pixel inside the raster are rejected
            prop_assert!(matting::segment(raster, &GrabCutParams::new(seed)).is_err());
            return Ok(());
        };

        let params = GrabCutParams::new(seed).with_iterations(iterations);
        let mask = matting::segment(raster, &params).unwrap();
        for y in 0..h {
            for x in 0..w {
                if !clipped.contains(x, y) {
                    prop_assert!(!mask.is_selected(x, y));
                }
            }
        }
        prop_assert!(mask.data.iter().all(|&v| v == 0 || v == 255));

        let again = matting::segment(raster, &params).unwrap();
        prop_assert_eq!(mask, again);
    }
}
