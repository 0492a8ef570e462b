use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use htmlclones::{
    ClusterConfig, DistanceMatrix, Fingerprint, MinHashSketch, PerceptualConfig, cluster_documents,
};
use perceptual::fingerprint_tokens;

/// Synthetic collection: every fifth document shares a template with its
/// neighbours, the rest carry mostly unique tokens.
fn sample_fingerprints(count: usize) -> Vec<Fingerprint> {
    let cfg = PerceptualConfig::default();
    (0..count)
        .map(|i| {
            let template = i / 5;
            let tokens: Vec<String> = (0..120)
                .map(|t| {
                    if t < 90 {
                        format!("tpl{template}-tok{t}")
                    } else {
                        format!("doc{i}-tok{t}")
                    }
                })
                .collect();
            fingerprint_tokens(&format!("doc-{i}.html"), &tokens, &cfg)
                .expect("fingerprint should succeed")
        })
        .collect()
}

fn bench_matrix_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_matrix");

    for &size in &[50usize, 200, 500] {
        let fingerprints = sample_fingerprints(size);
        let sketches: Vec<&MinHashSketch> = fingerprints.iter().map(|fp| &fp.sketch).collect();
        group.throughput(Throughput::Elements((size * (size - 1) / 2) as u64));

        for parallel in [false, true] {
            let cfg = ClusterConfig::default().with_parallel(parallel);
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, size), &sketches, |b, sketches| {
                b.iter(|| {
                    DistanceMatrix::build(black_box(sketches), &cfg).expect("build should succeed")
                });
            });
        }
    }

    group.finish();
}

fn bench_cluster_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_documents");
    let cfg = ClusterConfig::default();

    for &size in &[100usize, 400] {
        let fingerprints = sample_fingerprints(size);
        let names: Vec<&str> = fingerprints.iter().map(|fp| fp.doc_id.as_str()).collect();
        let sketches: Vec<&MinHashSketch> = fingerprints.iter().map(|fp| &fp.sketch).collect();

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                cluster_documents(black_box(&names), black_box(&sketches), &cfg)
                    .expect("clustering should succeed")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_matrix_build, bench_cluster_documents);
criterion_main!(benches);
