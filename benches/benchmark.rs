// Performance benchmarks for feature extraction and ranking
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pixrank_core::{CorpusEntry, EdgeDetector, Image, Vector};
use pixrank_similarity::{
    CannyDetector, FeatureExtractor, Metric, Ranker, Region, RetrievalConfig,
};
use rand::prelude::*;

fn generate_random_image(rows: usize, cols: usize) -> Image {
    let mut rng = rand::rng();
    Image::from_fn(rows, cols, |_, _| {
        [rng.random(), rng.random(), rng.random()]
    })
}

fn generate_random_vector(dim: usize) -> Vector {
    let mut rng = rand::rng();
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(0.0f32..1.0f32)).collect();
    Vector::new(data)
}

fn benchmark_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let config = RetrievalConfig::default();
    let image = generate_random_image(480, 640);

    let extractors = [
        FeatureExtractor::center_patch(&config),
        FeatureExtractor::chromaticity(&config),
        FeatureExtractor::region_rgb(&config, Region::Whole),
        FeatureExtractor::top_bottom_rgb(&config),
        FeatureExtractor::texture_color(&config),
    ];
    for extractor in extractors.iter() {
        group.bench_function(extractor.name(), |b| {
            b.iter(|| {
                let descriptor = extractor.extract("bench", black_box(&image)).unwrap();
                black_box(descriptor);
            });
        });
    }

    group.finish();
}

fn benchmark_edges(c: &mut Criterion) {
    let detector = CannyDetector::default();
    let image = generate_random_image(480, 640);

    c.bench_function("canny_edge_fraction", |b| {
        b.iter(|| black_box(detector.edge_fraction(black_box(&image))));
    });
}

fn benchmark_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for size in [100, 1000, 10000].iter() {
        let corpus: Vec<CorpusEntry> = (0..*size)
            .map(|i| CorpusEntry::new(format!("img{}.jpg", i), generate_random_vector(256)))
            .collect();
        let query = generate_random_vector(256).into();

        for metric in [Metric::HistogramIntersection, Metric::Cosine] {
            let ranker = Ranker::new(metric);
            group.bench_with_input(BenchmarkId::new(metric.name(), size), size, |b, _| {
                b.iter(|| {
                    let results = ranker.rank(black_box(&query), corpus.clone(), 10);
                    black_box(results);
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_extract, benchmark_edges, benchmark_rank);
criterion_main!(benches);
