use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};
use trsampling::{
    OptimalityCriterion, RecyclingPolicy, SamplerParams, TrustRegion, TrustRegionSampler,
};

fn criterion_sampling(c: &mut Criterion) {
    let dims = [2, 10];
    let sizes = [10, 50];

    let mut group = c.benchmark_group("trsampling");
    group.sample_size(10);
    for dim in dims {
        let region = TrustRegion::new(&Array1::zeros(dim), 1.).unwrap();
        // a previous design in [0, 1.9]^dim partially overlapping the region
        let previous =
            Array2::from_shape_fn((20, dim), |(i, j)| ((i * 7 + j * 3) % 20) as f64 / 10.);
        for size in sizes {
            for criterion in OptimalityCriterion::ALL {
                group.bench_function(format!("{criterion}-{dim}-dim-{size}-size"), |b| {
                    let params = SamplerParams::new(size)
                        .criterion(criterion)
                        .recycling(RecyclingPolicy::KeepFirst)
                        .n_iterations(100);
                    b.iter(|| {
                        black_box(
                            TrustRegionSampler::new(&region, params.clone())
                                .existing_points(&previous)
                                .seed(42)
                                .sample(),
                        )
                    });
                });
            }
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_sampling);
criterion_main!(benches);
