use std::hint::black_box;

use criterion::{
    measurement::Measurement, BatchSize, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};
use stabtree::IntervalIndex;

use crate::Lfsr;

#[derive(Debug, Clone, Copy)]
struct BenchName {
    bench: &'static str,
    n_values: usize,
    n_removes: usize,
}

impl From<BenchName> for BenchmarkId {
    fn from(v: BenchName) -> Self {
        Self::new(
            format!("{}_values_{}_n_removes", v.n_values, v.bench),
            v.n_removes,
        )
    }
}

pub(super) fn bench(c: &mut Criterion) {
    let mut g = c.benchmark_group("remove");

    // Index size
    for n_values in [1_000, 10_000] {
        // Number of removals
        for n_removes in [100, 1_000] {
            bench_param(&mut g, n_values, n_removes)
        }
    }
}

/// For an index containing `n_values`, perform two benchmarks that each
/// perform `n_removes`, one run causing all hits, one run causing all
/// misses.
fn bench_param<M>(g: &mut BenchmarkGroup<'_, M>, n_values: usize, n_removes: usize)
where
    M: Measurement,
{
    // The index must be at least as big as the number of removals.
    assert!(n_values >= n_removes);

    // Generate the index.
    let mut rand = Lfsr::default();
    let mut t = IntervalIndex::default();

    for _i in 0..n_values {
        t.insert(rand.next_span());
    }

    let bench_name = BenchName {
        bench: "misses",
        n_values,
        n_removes,
    };

    // Perform a benchmark that removes random spans that do not exist in the
    // index.
    g.throughput(Throughput::Elements(n_removes as _)); // Removals per second
    g.bench_function(BenchmarkId::from(bench_name), |b| {
        b.iter_batched(
            // Provide the index and the LFSR state after inserting n_values.
            //
            // It will now generate n_removes of different spans.
            || (t.clone(), rand.clone()),
            |(mut t, mut rand)| {
                for _ in 0..n_removes {
                    let span = rand.next_span();
                    black_box(t.remove(&span));
                }
                t
            },
            BatchSize::PerIteration,
        )
    });

    let bench_name = BenchName {
        bench: "hits",
        n_values,
        n_removes,
    };

    // Perform a benchmark that removes spans present in the index.
    g.throughput(Throughput::Elements(n_removes as _)); // Removals per second
    g.bench_function(BenchmarkId::from(bench_name), |b| {
        b.iter_batched(
            // Reset the LFSR.
            //
            // It will now generate the same sequence of random spans as what
            // was inserted into the index originally.
            || (t.clone(), Lfsr::default()),
            |(mut t, mut rand)| {
                for _ in 0..n_removes {
                    let span = rand.next_span();
                    black_box(t.remove(&span));
                }
                t
            },
            BatchSize::PerIteration,
        )
    });
}
