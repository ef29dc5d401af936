use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use listdiff_diff::{diff, DiffMode};

/// Deterministic shuffle: every `stride`-th element swaps with its neighbour,
/// every 10th is dropped, and a fresh identity is appended per 20 items.
fn perturbed(len: u64, stride: usize) -> (Vec<u64>, Vec<u64>) {
    let old: Vec<u64> = (0..len).collect();
    let mut new: Vec<u64> = old.iter().copied().filter(|v| v % 10 != 3).collect();
    for i in (0..new.len().saturating_sub(1)).step_by(stride) {
        new.swap(i, i + 1);
    }
    new.extend((0..len / 20).map(|i| len + i));
    (old, new)
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");
    for len in [100u64, 1_000, 10_000] {
        let (old, new) = perturbed(len, 7);
        group.bench_with_input(BenchmarkId::new("perturbed", len), &len, |b, _| {
            b.iter(|| {
                diff(
                    black_box(old.as_slice()),
                    black_box(new.as_slice()),
                    DiffMode::Equality,
                )
            })
        });
        group.bench_with_input(BenchmarkId::new("batch_safe", len), &len, |b, _| {
            b.iter(|| {
                diff(
                    black_box(old.as_slice()),
                    black_box(new.as_slice()),
                    DiffMode::Equality,
                )
                .to_batch_safe()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_diff);
criterion_main!(benches);
