// Query build / parse throughput
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use itemmap_core::{FieldConfiguration, Placement, SearchConfiguration};
use itemmap_query::{build_query, QueryParser};
use rand::prelude::*;

fn generate_config(field_count: usize) -> SearchConfiguration {
    let mut rng = StdRng::seed_from_u64(42);
    let fields = (0..field_count)
        .map(|i| {
            let placement = if rng.random_bool(0.5) {
                Placement::Required
            } else {
                Placement::Optional
            };
            if i % 2 == 0 {
                FieldConfiguration::vector(format!("field{i}"), placement, rng.random_range(0.0..1.0), 1.0)
            } else {
                FieldConfiguration::exact(format!("field{i}"), placement, rng.random_range(0.5..2.0))
            }
        })
        .collect();

    SearchConfiguration::new("bench")
        .with_fields(fields)
        .expect("generated names are unique")
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_query");

    for size in [4, 32, 256].iter() {
        let config = generate_config(*size);
        group.bench_with_input(BenchmarkId::new("fields", size), &config, |b, config| {
            b.iter(|| black_box(build_query(black_box(config))));
        });
    }

    group.finish();
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_query");

    for size in [4, 32, 256].iter() {
        let config = generate_config(*size);
        let doc = build_query(&config);
        let parser = QueryParser::new()
            .index_name("bench")
            .known_fields(config.fields().iter().map(|f| f.field_name.clone()));

        group.bench_with_input(BenchmarkId::new("fields", size), &doc, |b, doc| {
            b.iter(|| black_box(parser.parse(black_box(doc))));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_parse);
criterion_main!(benches);
