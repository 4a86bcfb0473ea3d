use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imgly_pixelcut::{
    compress_to_size, encoder_for, matting, ColorKeyParams, CompressionFormat, EncoderSettings,
    GrabCutParams, RasterView, RectSeed, Rgb, WandParams,
};

/// Centered disc over a horizontal gradient
fn synthetic(size: u32) -> Vec<u8> {
    let center = size as f32 / 2.0;
    let radius = size as f32 / 4.0;
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            if dx * dx + dy * dy < radius * radius {
                data.extend_from_slice(&[200, 40, 40, 255]);
            } else {
                let shade = (x * 255 / size) as u8;
                data.extend_from_slice(&[shade, shade, 255, 255]);
            }
        }
    }
    data
}

fn bench_color_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("color_key");
    for size in [256u32, 1024] {
        let data = synthetic(size);
        let params = ColorKeyParams::new(Rgb::new(0, 0, 255), 60.0).with_feather(20.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let raster = RasterView::new(&data, size, size).unwrap();
            b.iter(|| matting::remove_color(black_box(raster), &params).unwrap());
        });
    }
    group.finish();
}

fn bench_magic_wand(c: &mut Criterion) {
    let mut group = c.benchmark_group("magic_wand");
    let size = 512;
    let data = synthetic(size);
    let raster = RasterView::new(&data, size, size).unwrap();

    group.bench_function("connected", |b| {
        let params = WandParams::new(0, 0, 40.0);
        b.iter(|| matting::select(black_box(raster), &params).unwrap());
    });
    group.bench_function("global", |b| {
        let params = WandParams::new(0, 0, 40.0).global();
        b.iter(|| matting::select(black_box(raster), &params).unwrap());
    });
    group.finish();
}

fn bench_grabcut(c: &mut Criterion) {
    let mut group = c.benchmark_group("grabcut");
    group.sample_size(10);
    for size in [64u32, 128] {
        let data = synthetic(size);
        let margin = i64::from(size / 8);
        let extent = size - 2 * (size / 8);
        let params = GrabCutParams::new(RectSeed::new(margin, margin, extent, extent));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let raster = RasterView::new(&data, size, size).unwrap();
            b.iter(|| matting::segment(black_box(raster), &params).unwrap());
        });
    }
    group.finish();
}

fn bench_target_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_to_size");
    group.sample_size(10);
    let size = 256;
    let data = synthetic(size);
    let raster = RasterView::new(&data, size, size).unwrap();
    let settings = EncoderSettings::default();

    for format in [CompressionFormat::Jpeg, CompressionFormat::WebP] {
        let Ok(encoder) = encoder_for(format, &settings) else {
            continue;
        };
        group.bench_function(format.to_string(), |b| {
            b.iter(|| compress_to_size(black_box(raster), 8 * 1024, encoder.as_ref()).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_color_key,
    bench_magic_wand,
    bench_grabcut,
    bench_target_size
);
criterion_main!(benches);
