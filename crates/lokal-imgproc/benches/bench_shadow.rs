use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lokal_image::Image;
use lokal_imgproc::filter::shadow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bench_shadow(c: &mut Criterion) {
    let mut group = c.benchmark_group("Shadow");
    let mut rng = StdRng::seed_from_u64(42);

    for (width, height, depth) in [(256, 224, 1), (512, 448, 1), (256, 224, 8)] {
        group.throughput(criterion::Throughput::Elements(
            (width * height * depth) as u64,
        ));

        let parameter_string = format!("{}x{}x{}", width, height, depth);

        let data: Vec<u8> = (0..width * height * depth).map(|_| rng.random()).collect();
        let image_u8 = Image::<u8, 3>::new([width, height, depth], data).unwrap();
        let image_f32 = image_u8.cast::<f32>();

        group.bench_with_input(
            BenchmarkId::new("shadow_u8", &parameter_string),
            &image_u8,
            |b, src| {
                let mut dst = src.clone();
                b.iter(|| black_box(shadow(src, &mut dst, 1.0)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("shadow_f32", &parameter_string),
            &image_f32,
            |b, src| {
                let mut dst = src.clone();
                b.iter(|| black_box(shadow(src, &mut dst, 1.0)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_shadow);
criterion_main!(benches);
