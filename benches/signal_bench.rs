//! Benchmarks for the signal tree and the compiler.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use royal_icm::abstraction::ShowdownOdds;
use royal_icm::cards::Deck;
use royal_icm::compiler::Compiler;
use royal_icm::engine::EngineConfig;
use royal_icm::SignalTree;

fn signal_tree_benchmark(c: &mut Criterion) {
    let deck = Deck::royal();
    let mut group = c.benchmark_group("signal_tree");
    group.sample_size(10);
    group.bench_function("royal_build", |b| b.iter(|| SignalTree::build(black_box(&deck))));
    group.bench_function("royal_showdown_odds", |b| b.iter(|| ShowdownOdds::enumerate(black_box(&deck))));
    group.finish();
}

fn compile_benchmark(c: &mut Criterion) {
    let tree = SignalTree::build(&Deck::royal());
    let compiler = Compiler::new(&tree, EngineConfig::default());

    let mut group = c.benchmark_group("compile");
    group.sample_size(10);
    group.bench_function("stack_3", |b| b.iter(|| compiler.compile(black_box(3))));
    group.bench_function("tree_size_stack_6", |b| b.iter(|| compiler.tree_size(black_box(6))));
    group.finish();
}

criterion_group!(benches, signal_tree_benchmark, compile_benchmark);
criterion_main!(benches);
