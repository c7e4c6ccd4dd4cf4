use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use aig_rs::edge::Edge;
use aig_rs::network::Network;
use aig_rs::rewrite::{rewrite, RewriteOptions};

/// A random AIG over `num_inputs` inputs with `num_ands` AND nodes; every
/// node without readers is promoted to an output so nothing dangles.
fn random_network(num_inputs: usize, num_ands: usize, seed: u64) -> Network {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut network = Network::new();
    let mut edges: Vec<Edge> = (0..num_inputs).map(|_| network.add_input()).collect();
    while network.num_ands() < num_ands {
        let a = edges[rng.gen_range(0..edges.len())];
        let b = edges[rng.gen_range(0..edges.len())];
        let a = if rng.gen() { -a } else { a };
        let b = if rng.gen() { -b } else { b };
        if let Ok(e) = network.mk_and(a, b) {
            if !e.is_const() {
                edges.push(e);
            }
        }
    }
    for id in 0..network.num_nodes() as u32 {
        if network.is_and(id) && network.fanout_count(id) == 0 {
            network.add_output(Edge::positive(id));
        }
    }
    network
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    for &size in &[200usize, 1000, 5000] {
        group.bench_function(BenchmarkId::new("random", size), |b| {
            b.iter_batched(
                || random_network(16, size, 42),
                |mut network| rewrite(&mut network, &RewriteOptions::default()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_rewrite_zero_gain(c: &mut Criterion) {
    let options = RewriteOptions {
        accept_zero_gain: true,
        ..Default::default()
    };
    c.bench_function("rewrite/random_1000_zero_gain", |b| {
        b.iter_batched(
            || random_network(16, 1000, 42),
            |mut network| rewrite(&mut network, &options),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_rewrite, bench_rewrite_zero_gain);
criterion_main!(benches);
