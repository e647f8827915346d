use criterion::{black_box, criterion_group, criterion_main, Criterion};
use las::filter::{FilterChain, KeepEveryNth};
use las::transform_chain::{TransformChain, TranslateXyz};
use las::{Point, Reader, Writer};

fn roundtrip(npoints: usize) {
    let mut writer = Writer::default();
    for _ in 0..npoints {
        writer.write_point(Point::default()).unwrap();
    }
    let mut reader = Reader::new(writer.into_inner().unwrap()).unwrap();
    while reader.read_point().unwrap().is_some() {}
}

fn roundtrip_with_pipeline(npoints: usize) {
    let mut writer = Writer::default();
    for i in 0..npoints {
        writer
            .write_point(Point {
                x: i as f64,
                ..Default::default()
            })
            .unwrap();
    }
    let reader = Reader::new(writer.into_inner().unwrap()).unwrap();

    let mut filters = FilterChain::new();
    filters.push(Box::new(KeepEveryNth::new(2)));
    let mut transforms = TransformChain::new();
    transforms.push(Box::new(TranslateXyz::new(1., 0., 0.)));

    let mut pipeline = las::pipeline::ReaderPipeline::new(
        Box::new(las::pipeline::LasSource::new(reader)),
        filters,
        transforms,
    );
    let _ = pipeline.stored().unwrap();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("roundtrip");
    for &n in &[0usize, 1, 100, 10000] {
        group.bench_function(format!("points_{n}"), |b| {
            b.iter(|| roundtrip(black_box(n)))
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for &n in &[0usize, 1, 100, 10000] {
        group.bench_function(format!("points_{n}"), |b| {
            b.iter(|| roundtrip_with_pipeline(black_box(n)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_roundtrip, bench_pipeline);
criterion_main!(benches);
