use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;
use std::time::Duration;
use turntable::capture::geometry::{compute_heading, current_heading_from_position};
use turntable::{
    assemble, build_plan, capture_filename, Band, BandConfig, BandSettings, CapturedImage,
    DistanceSettings, HeadlessViewer, ModelBounds, RendererHost,
};

fn bands_with_count(count: u32) -> BandSettings {
    let mut bands = BandSettings::default();
    for band in Band::ALL {
        *bands.get_mut(band) = BandConfig::new(band.default_elevation()).with_count(count);
    }
    bands
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");
    group.measurement_time(Duration::from_secs(3));

    let distances = DistanceSettings::all().resolve(12.5);
    for count in [3u32, 36, 360] {
        let bands = bands_with_count(count);
        group.bench_with_input(BenchmarkId::new("build", count), &bands, |b, bands| {
            b.iter(|| build_plan(black_box(bands), black_box(17.0), &distances).unwrap())
        });
    }

    let plan = build_plan(&bands_with_count(36), 17.0, &distances).unwrap();
    group.bench_function("filenames_324", |b| {
        b.iter(|| plan.iter().map(capture_filename).collect::<Vec<_>>())
    });

    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");

    group.bench_function("compute_heading", |b| {
        b.iter(|| {
            (0..64u32)
                .map(|i| compute_heading(black_box(350.0), 64, i, black_box(120.0)))
                .sum::<f64>()
        })
    });
    group.bench_function("heading_from_position", |b| {
        b.iter(|| current_heading_from_position(black_box(DVec3::new(-3.0, 2.0, -4.0))))
    });

    group.finish();
}

fn bench_capture(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture");
    group.sample_size(20);

    let mut viewer = HeadlessViewer::new(256, 256);
    viewer.load_model(ModelBounds::from_size(DVec3::new(2.0, 1.0, 3.0)));
    group.bench_function("render_256", |b| b.iter(|| viewer.render().unwrap()));

    let images: Vec<CapturedImage> = (0..27)
        .map(|i| CapturedImage {
            filename: format!("shot_{}.png", i),
            bytes: vec![(i % 251) as u8; 64 * 1024],
        })
        .collect();
    group.bench_function("assemble_27x64k", |b| {
        b.iter(|| assemble(black_box(&images), "renders").unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_plan, bench_geometry, bench_capture);
criterion_main!(benches);
