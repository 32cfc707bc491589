use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lokal_image::Image;
use lokal_imgproc::engine::NeighborhoodEngine;
use lokal_imgproc::parallel::ExecutionStrategy;
use lokal_imgproc::threshold::{
    local_threshold_integral_with, local_threshold_with, LocalSauvola, ThresholdMethod,
};
use lokal_imgproc::{BoundaryPolicy, Shape};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_test_image(width: usize, height: usize) -> Image<u8, 2> {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..(width * height)).map(|_| rng.random()).collect();
    Image::new([width, height], data).unwrap()
}

fn bench_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("LocalThreshold");

    let (w, h) = (640, 480);
    let src = create_test_image(w, h);
    let method: ThresholdMethod = LocalSauvola::default().with_r(128.0).into();

    for span in [1, 3, 7, 15] {
        let parameter_string = format!("{}x{}_span{}", w, h, span);
        let engine = NeighborhoodEngine::new(Shape::rectangle(span, false).unwrap())
            .with_boundary(BoundaryPolicy::Clamp);

        // the direct scan grows with the window area
        group.bench_with_input(
            BenchmarkId::new("sauvola_direct", &parameter_string),
            &src,
            |b, src| {
                let mut dst = Image::from_shape_val(src.shape(), false).unwrap();
                b.iter(|| local_threshold_with(&engine, src, &mut dst, &method).unwrap())
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sauvola_integral", &parameter_string),
            &src,
            |b, src| {
                let mut dst = Image::from_shape_val(src.shape(), false).unwrap();
                b.iter(|| local_threshold_integral_with(&engine, src, &mut dst, &method).unwrap())
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sauvola_integral_serial", &parameter_string),
            &src,
            |b, src| {
                let engine = engine.with_strategy(ExecutionStrategy::Serial);
                let mut dst = Image::from_shape_val(src.shape(), false).unwrap();
                b.iter(|| local_threshold_integral_with(&engine, src, &mut dst, &method).unwrap())
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_threshold);
criterion_main!(benches);
